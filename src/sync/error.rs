//! sync::error
//!
//! The failure taxonomy surfaced by the synchronization core.

use thiserror::Error;

use crate::core::types::TypeError;
use crate::git::BackendError;
use crate::ui::notify::Notification;

/// Errors from repository operations.
///
/// The first four variants are classified: each has a notification
/// payload. Everything else passes through without one.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Checkout refused because local changes would be overwritten.
    #[error("checkout of '{branch}' aborted: local changes would be overwritten")]
    CheckoutConflict { branch: String, paths: Vec<String> },

    /// Branch creation refused because the name is taken.
    #[error("a branch named '{name}' already exists")]
    BranchExists { name: String },

    /// Remote refused a non-fast-forward push.
    #[error("push of '{branch}' rejected by the remote")]
    PushRejected { branch: String },

    /// Pull stopped with unresolved conflicts; the merge is still active.
    #[error("merge conflicts in {} file(s)", paths.len())]
    MergeConflict { paths: Vec<String> },

    /// A backend failure with no specialized meaning.
    #[error(transparent)]
    Unclassified(#[from] BackendError),

    #[error(transparent)]
    InvalidBranchName(#[from] TypeError),
}

impl SyncError {
    /// Title and description for the notification surface.
    ///
    /// `None` for errors without a classification; callers must not assume
    /// a payload exists.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            SyncError::CheckoutConflict { paths, .. } => {
                let mut description =
                    String::from("Your local changes to these files would be overwritten:");
                for path in paths {
                    description.push_str("\n  ");
                    description.push_str(path);
                }
                description.push_str("\nCommit or stash them before switching branches.");
                Some(Notification::error("Checkout aborted", description))
            }
            SyncError::BranchExists { name } => Some(Notification::error(
                "Cannot create branch",
                format!("A branch named '{name}' already exists."),
            )),
            SyncError::PushRejected { branch } => Some(Notification::error(
                "Push rejected",
                format!(
                    "The remote contains commits that '{branch}' does not have. \
                     Try pulling before pushing."
                ),
            )),
            SyncError::MergeConflict { paths } => {
                let mut description = String::from(
                    "Local and remote changes conflicted. Resolve the conflicts and commit to finish the merge.",
                );
                for path in paths {
                    description.push_str("\n  ");
                    description.push_str(path);
                }
                Some(Notification::warning("Merge conflicts", description))
            }
            SyncError::Unclassified(_) | SyncError::InvalidBranchName(_) => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        self.notification().is_some()
    }
}
