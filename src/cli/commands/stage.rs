//! stage and commit commands

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::Context;
use crate::ui::output;

/// Stage `paths` and show the new changed-file count.
///
/// Paths are taken relative to the directory gsync runs in, like `git add`.
pub fn stage(ctx: &Context, paths: &[String]) -> Result<()> {
    super::block_on(stage_async(ctx, paths))
}

async fn stage_async(ctx: &Context, paths: &[String]) -> Result<()> {
    let session = ctx.open()?;
    let resolved: Vec<String> = match session.repo.work_dir() {
        Some(work_dir) => {
            let cwd = ctx.cwd()?;
            paths
                .iter()
                .map(|path| repo_relative(&cwd, work_dir, path))
                .collect()
        }
        None => paths.to_vec(),
    };

    let outcome = session.repo.stage_files(resolved.as_slice()).await?;
    super::report(ctx, &format!("Staged {} path(s)", paths.len()), outcome)?;
    if outcome.is_completed() && !ctx.json {
        let count = session.repo.changed_file_count().await?;
        output::print(format!("Changed files: {count}"), ctx.verbosity);
    }
    Ok(())
}

/// Rewrite `path`, given relative to `cwd`, relative to the working tree
/// root the backend runs in.
///
/// Falls back to the absolute path when `cwd` is not under `work_dir`.
fn repo_relative(cwd: &Path, work_dir: &Path, path: &str) -> String {
    let absolute = cwd.join(path);
    let root = canonical(work_dir);
    let relative = canonical_parent(&absolute)
        .strip_prefix(&root)
        .map(Path::to_path_buf)
        .ok()
        .or_else(|| absolute.strip_prefix(work_dir).map(Path::to_path_buf).ok());

    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Some(rel) => rel.to_string_lossy().into_owned(),
        None => absolute.to_string_lossy().into_owned(),
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Canonicalize the directory part only; the file may not exist (a deletion).
fn canonical_parent(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => canonical(parent).join(name),
        _ => canonical(path),
    }
}

/// Commit staged changes.
pub fn commit(ctx: &Context, message: &str) -> Result<()> {
    super::block_on(commit_async(ctx, message))
}

async fn commit_async(ctx: &Context, message: &str) -> Result<()> {
    let session = ctx.open()?;
    let outcome = session.repo.commit(message).await?;
    super::report(ctx, "Committed", outcome)
}
