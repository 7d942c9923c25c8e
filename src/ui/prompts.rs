//! ui::prompts
//!
//! Interactive confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode a
//! confirmation fails with [`PromptError::NotInteractive`], and callers
//! treat that as a refusal.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Answer to a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Cancel,
}

/// Asks the user to accept or cancel an action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> Result<Decision, PromptError>;
}

/// y/N prompt on the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    interactive: bool,
}

impl TerminalConfirm {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, message: &str) -> Result<Decision, PromptError> {
        if !self.interactive {
            return Err(PromptError::NotInteractive);
        }

        let mut stderr = io::stderr();
        write!(stderr, "{message} [y/N] ").map_err(|e| PromptError::IoError(e.to_string()))?;
        stderr
            .flush()
            .map_err(|e| PromptError::IoError(e.to_string()))?;

        let mut answer = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut answer)
            .map_err(|e| PromptError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(parse_answer(&answer))
    }
}

/// Only an explicit yes accepts.
fn parse_answer(answer: &str) -> Decision {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Accept,
        _ => Decision::Cancel,
    }
}

/// Always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirm(pub Decision);

impl Confirm for FixedConfirm {
    fn confirm(&self, message: &str) -> Result<Decision, PromptError> {
        log::debug!("auto-answering {:?} to: {message}", self.0);
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_refuses() {
        let result = TerminalConfirm::new(false).confirm("Proceed?");
        assert!(matches!(result, Err(PromptError::NotInteractive)));
    }

    #[test]
    fn answers() {
        assert_eq!(parse_answer("y\n"), Decision::Accept);
        assert_eq!(parse_answer(" YES "), Decision::Accept);
        assert_eq!(parse_answer("\n"), Decision::Cancel);
        assert_eq!(parse_answer("nope"), Decision::Cancel);
    }

    #[test]
    fn fixed_confirm() {
        assert_eq!(
            FixedConfirm(Decision::Cancel).confirm("x").unwrap(),
            Decision::Cancel
        );
    }
}
