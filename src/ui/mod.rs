//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//! - [`notify`] - Notification payloads and sinks
//! - [`prompts`] - Interactive confirmations
//!
//! # Design
//!
//! The synchronization core never renders anything. It produces
//! notification payloads and asks for decisions through the traits here,
//! which the command line (or any other front end) implements.

pub mod notify;
pub mod output;
pub mod prompts;
