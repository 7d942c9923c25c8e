//! git::discover
//!
//! Repository discovery using git2.
//!
//! A repository is "present" only when discovery finds a non-bare
//! repository with a working directory. Everything else (no repository,
//! bare repository) maps to `Ok(None)` so callers can build an absent
//! repository instead of failing.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from repository discovery.
#[derive(Debug, Error)]
pub enum GitError {
    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

/// Location of a discovered repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    /// Path to the .git directory
    pub git_dir: PathBuf,
    /// Path to the working directory
    pub work_dir: PathBuf,
}

/// Find the repository containing `path`.
///
/// Returns `Ok(None)` when `path` is not inside a repository or the
/// repository is bare.
///
/// # Example
///
/// ```no_run
/// use gitsync::git::discover;
/// use std::path::Path;
///
/// match discover(Path::new(".")).unwrap() {
///     Some(info) => println!("working tree at {}", info.work_dir.display()),
///     None => println!("not in a repository"),
/// }
/// ```
pub fn discover(path: &Path) -> Result<Option<RepoInfo>, GitError> {
    let repo = match git2::Repository::discover(path) {
        Ok(repo) => repo,
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            log::debug!("no repository found from {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(work_dir) = repo.workdir() else {
        log::debug!("{} is a bare repository", repo.path().display());
        return Ok(None);
    };

    Ok(Some(RepoInfo {
        git_dir: repo.path().to_path_buf(),
        work_dir: work_dir.to_path_buf(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn not_a_repository() {
        let dir = TempDir::new().unwrap();
        assert_eq!(discover(dir.path()).unwrap(), None);
    }

    #[test]
    fn finds_work_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let info = discover(&nested).unwrap().expect("repository should be found");
        assert_eq!(
            info.work_dir.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        assert!(info.git_dir.ends_with(".git") || info.git_dir.ends_with(".git/"));
    }

    #[test]
    fn bare_repository_is_absent() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init_bare(dir.path()).unwrap();
        assert_eq!(discover(dir.path()).unwrap(), None);
    }
}
