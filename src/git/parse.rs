//! git::parse
//!
//! Parsers for git's machine-readable output.

use std::collections::BTreeSet;

/// Non-empty trimmed lines.
pub fn lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `git rev-list --left-right --count A...B` into `(left, right)`.
///
/// ```
/// use gitsync::git::parse::left_right_count;
///
/// assert_eq!(left_right_count("3\t1\n"), Some((3, 1)));
/// assert_eq!(left_right_count("garbage"), None);
/// ```
pub fn left_right_count(stdout: &str) -> Option<(u32, u32)> {
    let mut fields = stdout.split_whitespace();
    let left = fields.next()?.parse().ok()?;
    let right = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((left, right))
}

/// Distinct paths with any status in `git status --porcelain=v1` output.
///
/// Each path counts once no matter how many columns report it. Renames
/// and copies count their destination. Ignored entries (`!!`) are skipped,
/// and untracked entries (`??`) only count when `include_untracked` is set.
pub fn changed_paths(porcelain: &str, include_untracked: bool) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    for line in porcelain.lines() {
        let (Some(code), Some(rest)) = (line.get(..2), line.get(2..)) else {
            continue;
        };
        let path = rest.trim_start();
        if path.is_empty() {
            continue;
        }
        match code {
            "!!" => continue,
            "??" if !include_untracked => continue,
            _ => {}
        }
        let path = match path.split_once(" -> ") {
            Some((_, destination)) => destination,
            None => path,
        };
        paths.insert(unquote(path));
    }
    paths
}

/// Strip the double quotes git puts around paths with unusual characters.
fn unquote(path: &str) -> String {
    match path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => path.to_string(),
    }
}

/// Paths git lists under a "would be overwritten by <operation>" error.
///
/// Git prints the header line followed by one indented path per line and
/// ends the list with an unindented hint.
pub fn overwritten_paths(output: &str, operation: &str) -> Vec<String> {
    let header = format!("would be overwritten by {operation}");
    let mut paths = Vec::new();
    let mut in_list = false;
    for line in output.lines() {
        if line.contains(&header) {
            in_list = true;
            continue;
        }
        if !in_list {
            continue;
        }
        if line.starts_with('\t') || line.starts_with(' ') {
            let path = line.trim();
            if !path.is_empty() && !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        } else {
            in_list = false;
        }
    }
    paths
}

/// Paths named by `CONFLICT (...): Merge conflict in <path>` lines.
pub fn conflict_paths(output: &str) -> Vec<String> {
    const MARKER: &str = "Merge conflict in ";
    let mut paths: Vec<String> = Vec::new();
    for line in output.lines() {
        if !line.starts_with("CONFLICT") {
            continue;
        }
        if let Some((_, path)) = line.split_once(MARKER) {
            let path = path.trim();
            if !path.is_empty() && !paths.iter().any(|p| p == path) {
                paths.push(path.to_string());
            }
        }
    }
    paths
}
