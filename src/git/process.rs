//! git::process
//!
//! [`Backend`] implementation that runs the git executable.
//!
//! Every invocation is `git -C <work_dir> <args...>` with stdin closed,
//! terminal prompts disabled and the C locale forced, so that failure text
//! stays stable enough to classify.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::backend::{Backend, BackendError, BackendOutput, CommandFailure};

/// Git subprocess backend bound to one working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    work_dir: PathBuf,
}

impl GitCli {
    /// Backend running `git` from `PATH` inside `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("git"),
            work_dir: work_dir.into(),
        }
    }

    /// Use a specific git executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[async_trait]
impl Backend for GitCli {
    async fn execute(&self, args: &[String]) -> Result<BackendOutput, BackendError> {
        log::debug!("git {} (in {})", args.join(" "), self.work_dir.display());

        let output = Command::new(&self.program)
            .arg("-C")
            .arg(&self.work_dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BackendError::Spawn {
                program: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            return Ok(BackendOutput { stdout, stderr });
        }

        let failure = CommandFailure {
            args: args.to_vec(),
            exit_code: output.status.code(),
            stdout,
            stderr,
        };
        log::debug!("{}", failure);
        Err(BackendError::Failed(failure))
    }
}
