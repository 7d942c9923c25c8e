//! git::backend
//!
//! The backend collaborator contract.
//!
//! # Design
//!
//! The synchronization core never spawns processes itself. It hands an
//! argument vector to a [`Backend`] and receives either the raw output or a
//! tagged failure that carries everything needed for classification:
//! the arguments, the exit code, and both output streams.
//!
//! The trait is async because every invocation waits on an external,
//! possibly slow process. Implementations must be `Send + Sync` so a
//! repository can be shared across tasks.
//!
//! # Example
//!
//! ```ignore
//! use gitsync::git::{Backend, BackendError};
//!
//! async fn current_branch(backend: &dyn Backend) -> Result<String, BackendError> {
//!     let output = backend.execute(&["symbolic-ref".into(), "--short".into(), "HEAD".into()]).await?;
//!     Ok(output.stdout.trim().to_string())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Successful output of a backend invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOutput {
    pub stdout: String,
    pub stderr: String,
}

impl BackendOutput {
    /// Output with only stdout populated.
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// A command that ran and exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// Arguments passed to git (without the program name).
    pub args: Vec<String>,
    /// Exit code, or `None` if terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandFailure {
    pub fn new(args: &[&str], exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            args: args.iter().map(|s| s.to_string()).collect(),
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Attach stdout (git reports merge conflicts there).
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Both streams, stderr first, for pattern matching.
    pub fn combined_output(&self) -> String {
        match (self.stderr.trim().is_empty(), self.stdout.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stderr, self.stdout),
            (false, true) => self.stderr.clone(),
            (true, _) => self.stdout.clone(),
        }
    }

    /// First non-empty line of output, for short messages.
    pub fn summary(&self) -> &str {
        self.stderr
            .lines()
            .chain(self.stdout.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no output")
    }
}

impl std::fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "git {}", self.args.join(" "))?;
        match self.exit_code {
            Some(code) => write!(f, " exited with status {code}")?,
            None => write!(f, " was terminated by a signal")?,
        }
        write!(f, ": {}", self.summary())
    }
}

/// Errors from backend invocations.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The command ran and failed.
    #[error("{0}")]
    Failed(CommandFailure),

    /// The command could not be started at all.
    #[error("failed to run {program}: {message}")]
    Spawn {
        /// The program that was being started
        program: String,
        /// Description of the failure
        message: String,
    },
}

impl BackendError {
    /// The failure details, if the command actually ran.
    pub fn failure(&self) -> Option<&CommandFailure> {
        match self {
            BackendError::Failed(failure) => Some(failure),
            BackendError::Spawn { .. } => None,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.failure().and_then(|f| f.exit_code)
    }
}

/// Runs git commands for a single working directory.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Contract
///
/// - `Ok` means the command exited successfully.
/// - `Err(BackendError::Failed)` carries the raw streams untouched so the
///   caller can classify them.
/// - Nothing is retried or interpreted here.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run git with `args` and wait for it to finish.
    async fn execute(&self, args: &[String]) -> Result<BackendOutput, BackendError>;
}
