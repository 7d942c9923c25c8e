//! Architecture enforcement tests.
//!
//! The synchronization core talks to git only through the `Backend` trait,
//! and presentation layers talk to repositories only through the core.
//! These tests read the source tree and fail when a layer reaches past
//! its boundary.
//!
//! # Rules
//!
//! 1. Only `src/git/` may use `git2` or spawn processes
//! 2. `src/sync/` and `src/core/` must not depend on `crate::cli`
//! 3. CLI command handlers must not call the backend directly

use std::fs;
use std::path::{Path, PathBuf};

/// Collect every `.rs` file under `dir`, recursively.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn src(sub: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(sub)
}

/// Source text with `#[cfg(test)]` modules cut off.
fn production_source(path: &Path) -> String {
    let content = fs::read_to_string(path).expect("failed to read source file");
    match content.find("#[cfg(test)]") {
        Some(i) => content[..i].to_string(),
        None => content,
    }
}

fn violations(dir: &str, forbidden: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for path in rust_files(&src(dir)) {
        let source = production_source(&path);
        for (line_no, line) in source.lines().enumerate() {
            let code = line.trim_start();
            if code.starts_with("//") {
                continue;
            }
            for pattern in forbidden {
                if code.contains(pattern) {
                    found.push(format!("{}:{}: {}", path.display(), line_no + 1, code));
                }
            }
        }
    }
    found
}

#[test]
fn only_git_layer_touches_git() {
    for dir in ["sync", "core", "cli", "ui"] {
        let found = violations(dir, &["git2::", "std::process::Command", "tokio::process"]);
        assert!(
            found.is_empty(),
            "src/{dir} must go through the git backend:\n{}",
            found.join("\n")
        );
    }
}

#[test]
fn core_layers_do_not_depend_on_cli() {
    for dir in ["sync", "core", "git"] {
        let found = violations(dir, &["crate::cli"]);
        assert!(
            found.is_empty(),
            "src/{dir} must not depend on the CLI:\n{}",
            found.join("\n")
        );
    }
}

#[test]
fn handlers_use_the_repository() {
    let found = violations("cli/commands", &["GitCli", ".execute("]);
    assert!(
        found.is_empty(),
        "command handlers must call the repository, not the backend:\n{}",
        found.join("\n")
    );
}

#[test]
fn layout_is_present() {
    for dir in ["sync", "core", "git", "cli", "ui"] {
        assert!(
            !rust_files(&src(dir)).is_empty(),
            "expected sources under src/{dir}"
        );
    }
}
