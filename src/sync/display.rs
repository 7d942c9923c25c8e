//! sync::display
//!
//! The push/pull button label and the action it triggers.
//!
//! # Design
//!
//! The label is a pure function of the divergence and the repository's
//! remote/upstream/detached facts. Precedence, first match wins:
//!
//! | Condition | Label | Action |
//! |---|---|---|
//! | detached HEAD | `Not on branch` | none |
//! | no remote | `No remote` | none |
//! | no upstream | `Publish` | publish |
//! | 0 / 0 | `Fetch` | fetch |
//! | ahead only | `Push {a}` | push |
//! | behind only | `Pull {b}` | pull |
//! | both | `{a} Pull {b}` | pull |
//!
//! When both counts are non-zero, pull wins because pushing would be
//! rejected anyway.

use serde::Serialize;

use crate::core::types::AheadBehind;

use super::operations::{OperationClass, OperationFlags};

/// What triggering the sync control does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Fetch,
    Pull,
    Push,
    /// Push with `--set-upstream` to the default remote.
    Publish,
}

impl SyncAction {
    /// The operation class whose flag gates this action.
    pub fn class(self) -> OperationClass {
        match self {
            SyncAction::Fetch => OperationClass::Fetch,
            SyncAction::Pull => OperationClass::Pull,
            SyncAction::Push | SyncAction::Publish => OperationClass::Push,
        }
    }
}

/// Label plus action; `action` is `None` for inert states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDisplay {
    pub label: String,
    pub action: Option<SyncAction>,
}

impl SyncDisplay {
    fn inert(label: &str) -> Self {
        Self {
            label: label.to_string(),
            action: None,
        }
    }

    fn action(label: String, action: SyncAction) -> Self {
        Self {
            label,
            action: Some(action),
        }
    }

    pub fn is_inert(&self) -> bool {
        self.action.is_none()
    }

    /// Whether the control should be enabled given the in-flight flags.
    pub fn is_enabled(&self, flags: &OperationFlags) -> bool {
        self.action.is_some_and(|action| !flags.get(action.class()))
    }
}

/// Derive the sync control from raw facts.
///
/// # Example
///
/// ```
/// use gitsync::sync::{sync_display, SyncAction};
///
/// let display = sync_display(0, 2, true, true, false);
/// assert_eq!(display.label, "Pull 2");
/// assert_eq!(display.action, Some(SyncAction::Pull));
///
/// let both = sync_display(3, 1, true, true, false);
/// assert_eq!(both.label, "3 Pull 1");
/// ```
pub fn sync_display(
    ahead: u32,
    behind: u32,
    has_remote: bool,
    has_upstream: bool,
    is_detached: bool,
) -> SyncDisplay {
    if is_detached {
        return SyncDisplay::inert("Not on branch");
    }
    if !has_remote {
        return SyncDisplay::inert("No remote");
    }
    if !has_upstream {
        return SyncDisplay::action("Publish".to_string(), SyncAction::Publish);
    }
    match (ahead, behind) {
        (0, 0) => SyncDisplay::action("Fetch".to_string(), SyncAction::Fetch),
        (a, 0) => SyncDisplay::action(format!("Push {a}"), SyncAction::Push),
        (0, b) => SyncDisplay::action(format!("Pull {b}"), SyncAction::Pull),
        (a, b) => SyncDisplay::action(format!("{a} Pull {b}"), SyncAction::Pull),
    }
}

/// Derive the sync control from an [`AheadBehind`] snapshot.
///
/// `Unknown` keeps the control usable as a fetch, which is what recovers
/// a comparison that could not be computed.
pub fn display_for(ahead_behind: &AheadBehind) -> SyncDisplay {
    match *ahead_behind {
        AheadBehind::Diverged { ahead, behind } => sync_display(ahead, behind, true, true, false),
        AheadBehind::NoRemote => sync_display(0, 0, false, false, false),
        AheadBehind::NoUpstream => sync_display(0, 0, true, false, false),
        AheadBehind::Detached => sync_display(0, 0, true, false, true),
        AheadBehind::Unknown => sync_display(0, 0, true, true, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_table() {
        let cases = [
            ((0, 0, true, true, true), "Not on branch", None),
            ((5, 5, false, false, true), "Not on branch", None),
            ((0, 0, false, false, false), "No remote", None),
            ((0, 0, true, false, false), "Publish", Some(SyncAction::Publish)),
            ((0, 0, true, true, false), "Fetch", Some(SyncAction::Fetch)),
            ((4, 0, true, true, false), "Push 4", Some(SyncAction::Push)),
            ((0, 2, true, true, false), "Pull 2", Some(SyncAction::Pull)),
            ((1, 7, true, true, false), "1 Pull 7", Some(SyncAction::Pull)),
        ];
        for ((a, b, remote, upstream, detached), label, action) in cases {
            let display = sync_display(a, b, remote, upstream, detached);
            assert_eq!(display.label, label, "case {:?}", (a, b, remote, upstream, detached));
            assert_eq!(display.action, action);
        }
    }

    #[test]
    fn display_for_sentinels() {
        assert_eq!(display_for(&AheadBehind::Detached).label, "Not on branch");
        assert_eq!(display_for(&AheadBehind::NoRemote).label, "No remote");
        assert_eq!(display_for(&AheadBehind::NoUpstream).label, "Publish");
        assert_eq!(display_for(&AheadBehind::Unknown).label, "Fetch");
        assert_eq!(
            display_for(&AheadBehind::Diverged { ahead: 0, behind: 3 }).label,
            "Pull 3"
        );
    }

    #[test]
    fn enabled_tracks_relevant_flag() {
        let pull = sync_display(0, 1, true, true, false);
        let mut flags = OperationFlags::default();
        assert!(pull.is_enabled(&flags));

        flags.push = true;
        assert!(pull.is_enabled(&flags));

        flags.pull = true;
        assert!(!pull.is_enabled(&flags));

        let publish = sync_display(0, 0, true, false, false);
        assert!(!publish.is_enabled(&flags));
    }

    #[test]
    fn inert_never_enabled() {
        let display = sync_display(0, 0, false, false, false);
        assert!(display.is_inert());
        assert!(!display.is_enabled(&OperationFlags::default()));
    }
}
