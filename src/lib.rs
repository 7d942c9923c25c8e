//! gitsync - repository-state synchronization for git front-ends
//!
//! gitsync sits between git and a presentation layer. It tracks the current
//! branch, its divergence from upstream and the changed-file count, runs
//! checkout, fetch, pull, push and staging as supervised operations, and
//! turns git's failures into a small set of actionable notifications.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (one presentation layer)
//! - [`sync`] - The synchronization core: cache, operations, classification
//! - [`core`] - Domain types and configuration
//! - [`git`] - Backend contract, git CLI backend, discovery, parsers, mock
//! - [`ui`] - Output, notifications and confirmations
//!
//! # Correctness Invariants
//!
//! 1. At most one operation per class is in flight per repository
//! 2. In-flight flags are cleared on every exit path
//! 3. A snapshot is never served after an invalidation it predates
//! 4. No backend failure is swallowed: it is notified or returned

pub mod cli;
pub mod core;
pub mod git;
pub mod sync;
pub mod ui;
