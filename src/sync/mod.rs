//! sync
//!
//! The repository-state synchronization core.
//!
//! # Modules
//!
//! - [`operations`] - In-flight flags per operation class
//! - [`display`] - Push/pull control label derivation
//! - [`error`] - Failure taxonomy and notification payloads
//! - [`classify`] - Mapping raw backend failures onto the taxonomy
//! - [`model`] - The read model handed to the presentation layer
//! - [`repository`] - The core: cache, change signal, operations
//! - [`commands`] - Command entry points, including confirmed force-push
//!
//! # Data Flow
//!
//! ```text
//! request -> OperationStates (skip if busy) -> Backend
//!         -> success: invalidate -> change signal -> presentation re-reads
//!         -> failure: classify -> Notifier -> error returned
//! ```

pub mod classify;
pub mod commands;
pub mod display;
pub mod error;
pub mod model;
pub mod operations;
pub mod repository;

use std::fmt;

use serde::Serialize;

pub use commands::{CommandDispatcher, SyncCommand};
pub use display::{display_for, sync_display, SyncAction, SyncDisplay};
pub use error::SyncError;
pub use model::{BranchChoice, BranchChoices, ChoiceValue, ModelData, DETACHED_SENTINEL};
pub use operations::{OperationClass, OperationFlags, OperationGuard, OperationStates};
pub use repository::{CheckoutOptions, PushOptions, Repository, Snapshot};

/// Per-repository settings the core needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSettings {
    /// Remote used when publishing a branch with no upstream.
    pub default_remote: String,
    /// Whether untracked files count toward the changed-file count.
    pub count_untracked: bool,
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            default_remote: "origin".to_string(),
            count_untracked: true,
        }
    }
}

/// How an operation request ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    /// The backend ran and succeeded.
    Completed,
    /// Nothing ran.
    Skipped(SkipReason),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

/// Why a request did not reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Another operation of the same class is in flight.
    Busy(OperationClass),
    /// No working tree is associated.
    NotPresent,
    /// The repository has no remote to talk to.
    NoRemote,
    /// The sync control has no action in the current state.
    Inert,
    /// `stage_files` was given no paths.
    NothingToStage,
    /// A confirmation was declined.
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Busy(class) => write!(f, "a {class} is already in progress"),
            SkipReason::NotPresent => write!(f, "not inside a git working tree"),
            SkipReason::NoRemote => write!(f, "no remote configured"),
            SkipReason::Inert => write!(f, "nothing to synchronize"),
            SkipReason::NothingToStage => write!(f, "no paths given"),
            SkipReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_origin() {
        let settings = RepoSettings::default();
        assert_eq!(settings.default_remote, "origin");
        assert!(settings.count_untracked);
    }

    #[test]
    fn skip_reason_messages() {
        assert_eq!(
            SkipReason::Busy(OperationClass::Pull).to_string(),
            "a pull is already in progress"
        );
        assert_eq!(SkipReason::NoRemote.to_string(), "no remote configured");
    }

    #[test]
    fn outcome_serializes_reason() {
        let json = serde_json::to_value(Outcome::Skipped(SkipReason::Busy(OperationClass::Fetch)))
            .unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"]["busy"], "fetch");
        assert!(Outcome::Completed.is_completed());
    }
}
