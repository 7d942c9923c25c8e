//! core::types
//!
//! Strong types for the synchronization snapshots.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`BranchState`] - Immutable view of where HEAD points
//! - [`AheadBehind`] - Divergence of the current branch from its upstream
//!
//! Snapshots are produced wholesale by a refresh and never mutated in
//! place. A newer refresh supersedes an older snapshot entirely.
//!
//! # Examples
//!
//! ```
//! use gitsync::core::types::{AheadBehind, BranchName, BranchState};
//!
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! let state = BranchState::on_branch(&branch);
//! assert!(!state.is_detached());
//!
//! let divergence = AheadBehind::Diverged { ahead: 1, behind: 2 };
//! assert_eq!(divergence.counts(), Some((1, 2)));
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),
}

/// Sequences that may not appear anywhere in a branch name.
const FORBIDDEN_SEQUENCES: [&str; 3] = ["..", "@{", "//"];

/// Characters git refuses in ref names.
const FORBIDDEN_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

/// A validated Git branch name.
///
/// Follows `git check-ref-format --branch`: not empty, not `@`, no leading
/// `.` or `-`, no trailing `/` or `.lock`, none of `..`, `@{`, `//`, no
/// spaces, `~^:\?*[` or control characters, and no path component that
/// starts with `.` or ends with `.lock`.
///
/// # Example
///
/// ```
/// use gitsync::core::types::BranchName;
///
/// let name = BranchName::new("feature/my-branch").unwrap();
/// assert_eq!(name.as_str(), "feature/my-branch");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("@").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if let Some(reason) = Self::violation(&name) {
            return Err(TypeError::InvalidBranchName(format!("'{name}': {reason}")));
        }
        Ok(Self(name))
    }

    /// Describe the first rule `name` breaks, if any.
    fn violation(name: &str) -> Option<String> {
        if name.is_empty() {
            return Some("name cannot be empty".into());
        }
        if name == "@" {
            return Some("'@' is reserved".into());
        }
        if name.starts_with('-') {
            return Some("name cannot start with '-'".into());
        }
        if name.ends_with('/') {
            return Some("name cannot end with '/'".into());
        }
        if let Some(seq) = FORBIDDEN_SEQUENCES.iter().find(|seq| name.contains(*seq)) {
            return Some(format!("name cannot contain '{seq}'"));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Some(format!("name cannot contain '{c}'"));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return Some("name cannot contain control characters".into());
        }
        name.split('/')
            .filter(|component| !component.is_empty())
            .find_map(|component| {
                if component.starts_with('.') {
                    Some(format!("component '{component}' cannot start with '.'"))
                } else if component.ends_with(".lock") {
                    Some(format!("component '{component}' cannot end with '.lock'"))
                } else {
                    None
                }
            })
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where HEAD points.
///
/// When detached, `name` holds the short describe label of the checked-out
/// commit (for example `master~2`) rather than a branch name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    name: String,
    is_detached: bool,
}

impl BranchState {
    /// HEAD is attached to `branch`.
    pub fn on_branch(branch: &BranchName) -> Self {
        Self {
            name: branch.as_str().to_string(),
            is_detached: false,
        }
    }

    /// HEAD is detached; `label` is the describe string for the commit.
    pub fn detached(label: impl Into<String>) -> Self {
        Self {
            name: label.into(),
            is_detached: true,
        }
    }

    /// Branch name, or the describe label when detached.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_detached(&self) -> bool {
        self.is_detached
    }

    /// The branch HEAD is attached to, if any.
    pub fn branch(&self) -> Option<BranchName> {
        if self.is_detached {
            None
        } else {
            BranchName::new(self.name.as_str()).ok()
        }
    }
}

/// Divergence of the current branch from its upstream.
///
/// The sentinel variants explain why no counts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AheadBehind {
    /// Local and upstream tips compared.
    Diverged {
        /// Commits on the local branch missing upstream.
        ahead: u32,
        /// Commits upstream missing locally.
        behind: u32,
    },
    /// The repository has no remotes at all.
    NoRemote,
    /// The current branch does not track an upstream.
    NoUpstream,
    /// HEAD is detached; divergence is meaningless.
    Detached,
    /// The comparison could not be computed (for example an unborn branch).
    Unknown,
}

impl AheadBehind {
    /// `(ahead, behind)` when the comparison succeeded.
    pub fn counts(&self) -> Option<(u32, u32)> {
        match *self {
            AheadBehind::Diverged { ahead, behind } => Some((ahead, behind)),
            _ => None,
        }
    }

    pub fn has_remote(&self) -> bool {
        !matches!(self, AheadBehind::NoRemote)
    }

    pub fn has_upstream(&self) -> bool {
        matches!(self, AheadBehind::Diverged { .. } | AheadBehind::Unknown)
    }
}

impl std::fmt::Display for AheadBehind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AheadBehind::Diverged { ahead, behind } => write!(f, "{ahead} ahead, {behind} behind"),
            AheadBehind::NoRemote => write!(f, "no remote"),
            AheadBehind::NoUpstream => write!(f, "no upstream"),
            AheadBehind::Detached => write!(f, "detached"),
            AheadBehind::Unknown => write!(f, "unknown"),
        }
    }
}
