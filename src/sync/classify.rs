//! sync::classify
//!
//! Map raw backend failures onto [`SyncError`].
//!
//! # Design
//!
//! Structured signals are checked by the repository before these run
//! (ref existence before creating a branch, `MERGE_HEAD` and unmerged
//! paths after a pull). What remains is matching git's C-locale output,
//! which the subprocess backend forces. Anything unrecognized becomes
//! [`SyncError::Unclassified`] with the original failure intact.

use crate::git::parse::{conflict_paths, overwritten_paths};
use crate::git::{BackendError, CommandFailure};

use super::error::SyncError;

/// Patterns git prints when a push is not a fast-forward.
const PUSH_REJECTED_PATTERNS: [&str; 4] = [
    "[rejected]",
    "non-fast-forward",
    "fetch first",
    "Updates were rejected",
];

/// Patterns git prints when a merge stops on conflicts.
const MERGE_CONFLICT_PATTERNS: [&str; 3] = [
    "CONFLICT (",
    "Automatic merge failed",
    "would be overwritten by merge",
];

fn contains_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

pub fn is_checkout_conflict(output: &str) -> bool {
    output.contains("would be overwritten by checkout")
}

pub fn is_branch_exists(output: &str) -> bool {
    output.contains("a branch named") && output.contains("already exists")
}

pub fn is_push_rejected(output: &str) -> bool {
    contains_any(output, &PUSH_REJECTED_PATTERNS)
}

pub fn is_merge_conflict(output: &str) -> bool {
    contains_any(output, &MERGE_CONFLICT_PATTERNS)
}

fn unclassified(failure: &CommandFailure) -> SyncError {
    SyncError::Unclassified(BackendError::Failed(failure.clone()))
}

/// Classify a failed `checkout` (or `checkout -b`) of `branch`.
pub fn classify_checkout(err: BackendError, branch: &str) -> SyncError {
    let Some(failure) = err.failure() else {
        return SyncError::Unclassified(err);
    };
    let output = failure.combined_output();
    if is_checkout_conflict(&output) {
        return SyncError::CheckoutConflict {
            branch: branch.to_string(),
            paths: overwritten_paths(&output, "checkout"),
        };
    }
    if is_branch_exists(&output) {
        return SyncError::BranchExists {
            name: branch.to_string(),
        };
    }
    unclassified(failure)
}

/// Classify a failed `push` of `branch`.
pub fn classify_push(err: BackendError, branch: &str) -> SyncError {
    match err.failure() {
        Some(failure) if is_push_rejected(&failure.combined_output()) => SyncError::PushRejected {
            branch: branch.to_string(),
        },
        _ => SyncError::Unclassified(err),
    }
}

/// Classify a failed `pull` from its text alone.
///
/// Used when the backend offers no merge state to inspect.
pub fn classify_pull(err: BackendError) -> SyncError {
    let Some(failure) = err.failure() else {
        return SyncError::Unclassified(err);
    };
    let output = failure.combined_output();
    if is_merge_conflict(&output) {
        let mut paths = conflict_paths(&output);
        if paths.is_empty() {
            paths = overwritten_paths(&output, "merge");
        }
        return SyncError::MergeConflict { paths };
    }
    unclassified(failure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(args: &[&str], stderr: &str) -> BackendError {
        BackendError::Failed(CommandFailure::new(args, 1, stderr))
    }

    #[test]
    fn checkout_overwrite_is_conflict() {
        let err = failed(
            &["checkout", "feature"],
            "error: Your local changes to the following files would be overwritten by checkout:\n\
             \tnotes.txt\n\
             Please commit your changes or stash them before you switch branches.\n\
             Aborting\n",
        );
        match classify_checkout(err, "feature") {
            SyncError::CheckoutConflict { branch, paths } => {
                assert_eq!(branch, "feature");
                assert_eq!(paths, vec!["notes.txt"]);
            }
            other => panic!("expected CheckoutConflict, got {other:?}"),
        }
    }

    #[test]
    fn checkout_existing_branch() {
        let err = failed(
            &["checkout", "-b", "dup"],
            "fatal: a branch named 'dup' already exists\n",
        );
        assert!(matches!(
            classify_checkout(err, "dup"),
            SyncError::BranchExists { name } if name == "dup"
        ));
    }

    #[test]
    fn checkout_unknown_passthrough() {
        let err = failed(
            &["checkout", "nope"],
            "error: pathspec 'nope' did not match any file(s) known to git\n",
        );
        assert!(matches!(
            classify_checkout(err, "nope"),
            SyncError::Unclassified(_)
        ));
    }

    #[test]
    fn push_rejections() {
        for stderr in [
            " ! [rejected]        main -> main (non-fast-forward)\n",
            " ! [rejected]        main -> main (fetch first)\n",
            "hint: Updates were rejected because the tip of your current branch is behind\n",
        ] {
            assert!(matches!(
                classify_push(failed(&["push"], stderr), "main"),
                SyncError::PushRejected { .. }
            ));
        }
    }

    #[test]
    fn push_auth_failure_passthrough() {
        let err = failed(
            &["push"],
            "fatal: Authentication failed for 'https://example.com/repo.git/'\n",
        );
        assert!(matches!(classify_push(err, "main"), SyncError::Unclassified(_)));
    }

    #[test]
    fn pull_conflict_from_stdout() {
        let err = BackendError::Failed(
            CommandFailure::new(&["pull"], 1, "").with_stdout(
                "Auto-merging a.txt\n\
                 CONFLICT (content): Merge conflict in a.txt\n\
                 Automatic merge failed; fix conflicts and then commit the result.\n",
            ),
        );
        match classify_pull(err) {
            SyncError::MergeConflict { paths } => assert_eq!(paths, vec!["a.txt"]),
            other => panic!("expected MergeConflict, got {other:?}"),
        }
    }

    #[test]
    fn pull_overwrite_by_merge() {
        let err = failed(
            &["pull"],
            "error: Your local changes to the following files would be overwritten by merge:\n\
             \tlocal.txt\n\
             Please commit your changes or stash them before you merge.\n\
             Aborting\n",
        );
        match classify_pull(err) {
            SyncError::MergeConflict { paths } => assert_eq!(paths, vec!["local.txt"]),
            other => panic!("expected MergeConflict, got {other:?}"),
        }
    }

    #[test]
    fn spawn_errors_are_unclassified() {
        let err = BackendError::Spawn {
            program: "git".into(),
            message: "No such file or directory".into(),
        };
        assert!(matches!(classify_pull(err.clone()), SyncError::Unclassified(_)));
        assert!(matches!(classify_push(err.clone(), "main"), SyncError::Unclassified(_)));
        assert!(matches!(classify_checkout(err, "main"), SyncError::Unclassified(_)));
    }
}
