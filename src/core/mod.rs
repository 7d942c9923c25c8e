//! core
//!
//! Core domain types and configuration for gitsync.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, BranchState, AheadBehind
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Snapshots are immutable values, replaced wholesale
//! - Schemas are strict and self-describing

pub mod config;
pub mod types;
