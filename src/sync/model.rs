//! sync::model
//!
//! The read model the presentation layer renders after every change.
//!
//! # Design
//!
//! A presentation layer performs one read per change signal and gets
//! everything it needs: the branch selector entries, the sync control,
//! the changed-file badge and the in-flight flags that decide which
//! controls to disable.
//!
//! The branch selector value is a [`ChoiceValue`], not a plain string, so
//! the detached entry cannot be confused with a real branch that happens
//! to be called `detached`.

use serde::Serialize;

use crate::core::types::{AheadBehind, BranchName, BranchState};

use super::display::{display_for, SyncDisplay};
use super::operations::OperationFlags;

/// Reserved selection value for the synthetic detached entry.
pub const DETACHED_SENTINEL: &str = "detached";

/// Value of a branch selector entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum ChoiceValue {
    /// The synthetic entry shown while HEAD is detached.
    Detached,
    Branch(BranchName),
}

impl ChoiceValue {
    /// String form used by selectors that only carry text.
    ///
    /// Real branches are prefixed with `refs/heads/`, which no sentinel
    /// shares.
    pub fn as_key(&self) -> String {
        match self {
            ChoiceValue::Detached => DETACHED_SENTINEL.to_string(),
            ChoiceValue::Branch(name) => format!("refs/heads/{name}"),
        }
    }
}

/// One entry in the branch selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchChoice {
    pub label: String,
    pub value: ChoiceValue,
    pub disabled: bool,
}

/// Branch selector contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchChoices {
    pub entries: Vec<BranchChoice>,
    /// Index of the active entry.
    pub selected: Option<usize>,
}

impl BranchChoices {
    /// Build the selector from the sorted branch list and the current state.
    ///
    /// When detached, a disabled entry labelled with the describe string is
    /// prepended and selected.
    pub fn build(branches: &[BranchName], state: Option<&BranchState>) -> Self {
        let mut entries = Vec::with_capacity(branches.len() + 1);
        let mut selected = None;

        if let Some(state) = state.filter(|s| s.is_detached()) {
            entries.push(BranchChoice {
                label: state.name().to_string(),
                value: ChoiceValue::Detached,
                disabled: true,
            });
            selected = Some(0);
        }

        for branch in branches {
            if selected.is_none() && state.is_some_and(|s| s.name() == branch.as_str()) {
                selected = Some(entries.len());
            }
            entries.push(BranchChoice {
                label: branch.to_string(),
                value: ChoiceValue::Branch(branch.clone()),
                disabled: false,
            });
        }

        Self { entries, selected }
    }

    pub fn selected(&self) -> Option<&BranchChoice> {
        self.selected.and_then(|i| self.entries.get(i))
    }
}

/// Everything the presentation layer reads in one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelData {
    pub present: bool,
    pub branch_state: Option<BranchState>,
    pub branch_choices: BranchChoices,
    pub ahead_behind: Option<AheadBehind>,
    pub sync: Option<SyncDisplay>,
    /// Whether the sync control is clickable right now.
    pub sync_enabled: bool,
    pub changed_file_count: usize,
    pub operation_states: OperationFlags,
    pub merge_in_progress: bool,
}

impl ModelData {
    /// Model for a repository with no working tree.
    pub fn absent() -> Self {
        Self {
            present: false,
            branch_state: None,
            branch_choices: BranchChoices::default(),
            ahead_behind: None,
            sync: None,
            sync_enabled: false,
            changed_file_count: 0,
            operation_states: OperationFlags::default(),
            merge_in_progress: false,
        }
    }

    pub(crate) fn assemble(
        snapshot: &super::repository::Snapshot,
        operation_states: OperationFlags,
    ) -> Self {
        let sync = snapshot.ahead_behind.as_ref().map(display_for);
        let sync_enabled = sync
            .as_ref()
            .is_some_and(|display| display.is_enabled(&operation_states));
        Self {
            present: true,
            branch_state: snapshot.branch_state.clone(),
            branch_choices: BranchChoices::build(
                &snapshot.branches,
                snapshot.branch_state.as_ref(),
            ),
            ahead_behind: snapshot.ahead_behind,
            sync,
            sync_enabled,
            changed_file_count: snapshot.changed_file_count,
            operation_states,
            merge_in_progress: snapshot.merge_in_progress,
        }
    }
}
