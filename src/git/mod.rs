//! git
//!
//! The doorway to Git for the synchronization core.
//!
//! # Architecture
//!
//! Repository discovery uses `git2`. Everything else goes through the
//! [`Backend`] trait, which runs git subcommands and hands back raw output
//! or a tagged [`CommandFailure`]. The production backend is [`GitCli`];
//! tests use [`mock::MockBackend`].
//!
//! # Responsibilities
//!
//! - Repository discovery ([`discover`])
//! - Running git subcommands ([`Backend`], [`GitCli`])
//! - Parsing git's machine-readable output ([`parse`])
//!
//! # Invariants
//!
//! - No other module imports `git2`
//! - Failures keep the arguments, exit code and both streams intact
//!
//! # Example
//!
//! ```ignore
//! use gitsync::git::{discover, Backend, GitCli};
//! use std::path::Path;
//!
//! if let Some(info) = discover(Path::new("."))? {
//!     let git = GitCli::new(info.work_dir);
//!     let out = git.execute(&["remote".to_string()]).await?;
//!     println!("{}", out.stdout);
//! }
//! ```

mod backend;
mod discover;
pub mod mock;
pub mod parse;
mod process;

pub use backend::{Backend, BackendError, BackendOutput, CommandFailure};
pub use discover::{discover, GitError, RepoInfo};
pub use process::GitCli;
