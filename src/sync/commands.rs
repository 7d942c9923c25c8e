//! sync::commands
//!
//! Command entry points for fetch, pull, push and force-push.
//!
//! # Design
//!
//! The dispatcher routes named commands to the same [`Repository`]
//! operations the sync control uses. Force-push is destructive on the
//! remote, so it asks a [`Confirm`] capability first; a declined or
//! unanswerable prompt ends the command as [`SkipReason::Cancelled`]
//! without touching the backend.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::ui::prompts::{Confirm, Decision};

use super::error::SyncError;
use super::repository::{PushOptions, Repository};
use super::{Outcome, SkipReason};

/// Commands the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    Fetch,
    Pull,
    Push,
    ForcePush,
}

impl SyncCommand {
    pub fn id(self) -> &'static str {
        match self {
            SyncCommand::Fetch => "git.fetch",
            SyncCommand::Pull => "git.pull",
            SyncCommand::Push => "git.push",
            SyncCommand::ForcePush => "git.force-push",
        }
    }
}

impl fmt::Display for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SyncCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git.fetch" | "fetch" => Ok(SyncCommand::Fetch),
            "git.pull" | "pull" => Ok(SyncCommand::Pull),
            "git.push" | "push" => Ok(SyncCommand::Push),
            "git.force-push" | "force-push" => Ok(SyncCommand::ForcePush),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// Routes commands to a repository.
pub struct CommandDispatcher {
    repo: Arc<Repository>,
    confirm: Arc<dyn Confirm>,
    confirm_force_push: bool,
}

impl CommandDispatcher {
    pub fn new(repo: Arc<Repository>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            repo,
            confirm,
            confirm_force_push: true,
        }
    }

    /// Whether force-push asks for confirmation first.
    pub fn with_force_push_confirmation(mut self, required: bool) -> Self {
        self.confirm_force_push = required;
        self
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    pub async fn dispatch(&self, command: SyncCommand) -> Result<Outcome, SyncError> {
        log::debug!("dispatching {command}");
        match command {
            SyncCommand::Fetch => self.repo.fetch().await,
            SyncCommand::Pull => self.repo.pull().await,
            SyncCommand::Push => self.push(PushOptions::default()).await,
            SyncCommand::ForcePush => {
                self.push(PushOptions {
                    force: true,
                    set_upstream: false,
                })
                .await
            }
        }
    }

    /// Push the current branch, confirming first when forcing.
    pub async fn push(&self, options: PushOptions) -> Result<Outcome, SyncError> {
        if !self.repo.is_present() {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        }
        let Some(branch) = self
            .repo
            .current_branch()
            .await?
            .and_then(|state| state.branch())
        else {
            log::info!("push skipped: HEAD is detached");
            return Ok(Outcome::Skipped(SkipReason::Inert));
        };

        if options.force && self.confirm_force_push {
            let message = format!("Force push '{branch}'? This overwrites the remote branch.");
            match self.confirm.confirm(&message) {
                Ok(Decision::Accept) => {}
                Ok(Decision::Cancel) => {
                    log::info!("force push of {branch} cancelled");
                    return Ok(Outcome::Skipped(SkipReason::Cancelled));
                }
                Err(err) => {
                    log::info!("force push of {branch} not confirmed: {err}");
                    return Ok(Outcome::Skipped(SkipReason::Cancelled));
                }
            }
        }

        self.repo.push(branch.as_str(), options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::mock::MockBackend;
    use crate::sync::RepoSettings;
    use crate::ui::notify::RecordingNotifier;
    use crate::ui::prompts::{FixedConfirm, TerminalConfirm};

    fn dispatcher(backend: &MockBackend, confirm: Arc<dyn Confirm>) -> CommandDispatcher {
        let repo = Repository::new(
            "/work",
            Arc::new(backend.clone()),
            Arc::new(RecordingNotifier::new()),
            RepoSettings::default(),
        );
        CommandDispatcher::new(Arc::new(repo), confirm)
    }

    fn diverged() -> MockBackend {
        MockBackend::new()
            .with_remote("origin")
            .with_upstream("main", "origin/main", 2, 1)
    }

    #[test]
    fn parses_command_ids() {
        assert_eq!("git.fetch".parse::<SyncCommand>(), Ok(SyncCommand::Fetch));
        assert_eq!("force-push".parse::<SyncCommand>(), Ok(SyncCommand::ForcePush));
        assert!("git.rebase".parse::<SyncCommand>().is_err());
        assert_eq!(SyncCommand::ForcePush.to_string(), "git.force-push");
    }

    #[tokio::test]
    async fn force_push_accepted() {
        let backend = diverged();
        let dispatcher = dispatcher(&backend, Arc::new(FixedConfirm(Decision::Accept)));

        let outcome = dispatcher.dispatch(SyncCommand::ForcePush).await.unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert!(backend
            .invocations()
            .iter()
            .any(|args| args.first().map(String::as_str) == Some("push")
                && args.contains(&"--force".to_string())));
    }

    #[tokio::test]
    async fn force_push_cancelled() {
        let backend = diverged();
        let dispatcher = dispatcher(&backend, Arc::new(FixedConfirm(Decision::Cancel)));

        let outcome = dispatcher.dispatch(SyncCommand::ForcePush).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Cancelled));
        assert_eq!(backend.count("push"), 0);
    }

    #[tokio::test]
    async fn force_push_without_terminal_is_cancelled() {
        let backend = diverged();
        let dispatcher = dispatcher(&backend, Arc::new(TerminalConfirm::new(false)));

        let outcome = dispatcher.dispatch(SyncCommand::ForcePush).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Cancelled));
        assert_eq!(backend.count("push"), 0);
    }

    #[tokio::test]
    async fn confirmation_can_be_disabled() {
        let backend = diverged();
        let dispatcher = dispatcher(&backend, Arc::new(FixedConfirm(Decision::Cancel)))
            .with_force_push_confirmation(false);

        let outcome = dispatcher.dispatch(SyncCommand::ForcePush).await.unwrap();
        assert_eq!(outcome, Outcome::Completed);
    }

    #[tokio::test]
    async fn plain_push_never_prompts() {
        let backend = diverged();
        let dispatcher = dispatcher(&backend, Arc::new(FixedConfirm(Decision::Cancel)));

        dispatcher.dispatch(SyncCommand::Push).await.unwrap();
        assert_eq!(backend.count("push"), 1);
    }

    #[tokio::test]
    async fn detached_push_is_inert() {
        let backend = MockBackend::new().with_remote("origin").detached_at("main~1");
        let dispatcher = dispatcher(&backend, Arc::new(FixedConfirm(Decision::Accept)));

        let outcome = dispatcher.dispatch(SyncCommand::ForcePush).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Inert));
        assert_eq!(backend.count("push"), 0);
    }
}
