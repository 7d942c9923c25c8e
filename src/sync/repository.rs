//! sync::repository
//!
//! The synchronization core.
//!
//! # Design
//!
//! A [`Repository`] sits between a [`Backend`] and a presentation layer.
//! It owns:
//!
//! - a cached [`Snapshot`] of branch state, divergence, the changed-file
//!   count, the branch list and merge state
//! - the [`OperationStates`] that serialize each operation class
//! - a change signal (`tokio::sync::watch`) that ticks once per
//!   invalidation
//!
//! Every mutating call invalidates on success. [`Repository::invalidate`]
//! exists for changes made outside the process (file-system events).
//!
//! ## Cache coherence
//!
//! Each snapshot is stamped with the invalidation generation observed when
//! its refresh began. A snapshot is served only while that generation is
//! still current, so a refresh that raced with an invalidation is never
//! mistaken for a fresh one.
//!
//! ## Contention
//!
//! Operations take their class guard before touching the backend. A second
//! request of the same class returns [`Outcome::Skipped`] without a single
//! backend invocation.
//!
//! ## Failures
//!
//! Failures are classified (see [`super::classify`]), reported through the
//! [`Notifier`] when they carry a notification, logged, and returned. Flags
//! are released on every path by the guard.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gitsync::git::mock::MockBackend;
//! use gitsync::sync::{Repository, RepoSettings};
//! use gitsync::ui::notify::RecordingNotifier;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new()
//!     .with_remote("origin")
//!     .with_upstream("main", "origin/main", 0, 2);
//! let repo = Repository::new("/work", Arc::new(backend), Arc::new(RecordingNotifier::new()), RepoSettings::default());
//!
//! let model = repo.model().await.unwrap();
//! assert_eq!(model.sync.unwrap().label, "Pull 2");
//! # });
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::core::config::Config;
use crate::core::types::{AheadBehind, BranchName, BranchState};
use crate::git::parse::{changed_paths, conflict_paths, left_right_count, lines};
use crate::git::{discover, Backend, BackendError, BackendOutput, GitCli, GitError, RepoInfo};
use crate::ui::notify::Notifier;

use super::classify::{classify_checkout, classify_pull, classify_push};
use super::display::{display_for, SyncAction};
use super::error::SyncError;
use super::model::{BranchChoices, ModelData};
use super::operations::{OperationClass, OperationStates};
use super::{Outcome, RepoSettings, SkipReason};

/// Point-in-time view of the repository, produced wholesale by a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// `None` when the repository is not present.
    pub branch_state: Option<BranchState>,
    pub ahead_behind: Option<AheadBehind>,
    /// Distinct paths with any staged, unstaged or untracked status.
    pub changed_file_count: usize,
    /// Local branches, alphabetical.
    pub branches: Vec<BranchName>,
    pub merge_in_progress: bool,
}

/// Merge state kept for a pull git refused without starting a merge.
///
/// Holds while any of `paths` is still dirty. With no paths, holds while
/// the working tree has any change.
#[derive(Debug, Clone)]
struct PendingMerge {
    paths: Vec<String>,
}

impl PendingMerge {
    fn still_blocked(&self, changed: &BTreeSet<String>) -> bool {
        if self.paths.is_empty() {
            !changed.is_empty()
        } else {
            self.paths.iter().any(|path| changed.contains(path))
        }
    }
}

/// How a failed pull left the repository.
enum PullFailure {
    /// git recorded a merge (`MERGE_HEAD`); its state is authoritative.
    MergeStarted(SyncError),
    /// Classified from output text alone.
    Reported(SyncError),
}

#[derive(Debug)]
struct CachedSnapshot {
    generation: u64,
    snapshot: Snapshot,
}

/// Options for [`Repository::checkout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutOptions {
    /// Create the branch and switch to it.
    pub create_new: bool,
}

/// Options for [`Repository::push`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOptions {
    /// Overwrite the remote branch even when not a fast-forward.
    pub force: bool,
    /// Record the pushed branch as upstream. Implied when none exists.
    pub set_upstream: bool,
}

/// The synchronization core for one working directory.
pub struct Repository {
    work_dir: Option<PathBuf>,
    backend: Option<Arc<dyn Backend>>,
    notifier: Arc<dyn Notifier>,
    settings: RepoSettings,
    operations: OperationStates,
    cache: Mutex<Option<CachedSnapshot>>,
    /// A refused pull git itself does not record as a merge.
    merge_pending: Mutex<Option<PendingMerge>>,
    generation: watch::Sender<u64>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("work_dir", &self.work_dir)
            .field("present", &self.is_present())
            .field("settings", &self.settings)
            .field("operations", &self.operations)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// A present repository backed by `backend`.
    pub fn new(
        work_dir: impl Into<PathBuf>,
        backend: Arc<dyn Backend>,
        notifier: Arc<dyn Notifier>,
        settings: RepoSettings,
    ) -> Self {
        Self::build(Some(work_dir.into()), Some(backend), notifier, settings)
    }

    /// A repository with no working tree. Every operation is a no-op and
    /// every read is empty.
    pub fn absent(notifier: Arc<dyn Notifier>) -> Self {
        Self::build(None, None, notifier, RepoSettings::default())
    }

    fn build(
        work_dir: Option<PathBuf>,
        backend: Option<Arc<dyn Backend>>,
        notifier: Arc<dyn Notifier>,
        settings: RepoSettings,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            work_dir,
            backend,
            notifier,
            settings,
            operations: OperationStates::new(),
            cache: Mutex::new(None),
            merge_pending: Mutex::new(None),
            generation,
        }
    }

    /// Discover the repository containing `path` and bind the git CLI to it.
    ///
    /// Outside a repository (or in a bare one) this yields an absent
    /// repository rather than an error.
    pub fn open(
        path: &Path,
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, GitError> {
        Ok(Self::from_info(discover(path)?, config, notifier))
    }

    /// Bind the git CLI to an already discovered repository; `None` yields
    /// an absent repository.
    pub fn from_info(
        info: Option<RepoInfo>,
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        match info {
            Some(info) => {
                log::debug!("opened repository at {}", info.work_dir.display());
                let backend = GitCli::new(info.work_dir.clone()).with_program(config.git_binary());
                Self::new(
                    info.work_dir,
                    Arc::new(backend),
                    notifier,
                    config.repo_settings(),
                )
            }
            None => Self::absent(notifier),
        }
    }

    pub fn is_present(&self) -> bool {
        self.backend.is_some()
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    pub fn settings(&self) -> &RepoSettings {
        &self.settings
    }

    pub fn operation_states(&self) -> &OperationStates {
        &self.operations
    }

    // =========================================================================
    // Change signal and cache
    // =========================================================================

    /// Receiver that observes one change per invalidation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Current invalidation generation.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Mark every cached snapshot stale and signal subscribers.
    pub fn invalidate(&self) {
        self.generation.send_modify(|generation| *generation += 1);
        log::debug!("cache invalidated (generation {})", self.generation());
    }

    fn cache(&self) -> MutexGuard<'_, Option<CachedSnapshot>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending_merge(&self) -> MutexGuard<'_, Option<PendingMerge>> {
        self.merge_pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self) -> Option<Snapshot> {
        let current = self.generation();
        self.cache()
            .as_ref()
            .filter(|cached| cached.generation == current)
            .map(|cached| cached.snapshot.clone())
    }

    /// Recompute every snapshot from the backend.
    pub async fn refresh(&self) -> Result<Snapshot, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Snapshot::default());
        };
        let generation = self.generation();
        let snapshot = self.compute(backend).await?;
        *self.cache() = Some(CachedSnapshot {
            generation,
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// The cached snapshot if still valid, otherwise a fresh one.
    pub async fn snapshot(&self) -> Result<Snapshot, SyncError> {
        match self.cached() {
            Some(snapshot) => Ok(snapshot),
            None => self.refresh().await,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Where HEAD points; `None` when not present.
    pub async fn current_branch(&self) -> Result<Option<BranchState>, SyncError> {
        Ok(self.snapshot().await?.branch_state)
    }

    pub async fn ahead_behind(&self) -> Result<Option<AheadBehind>, SyncError> {
        Ok(self.snapshot().await?.ahead_behind)
    }

    pub async fn changed_file_count(&self) -> Result<usize, SyncError> {
        Ok(self.snapshot().await?.changed_file_count)
    }

    /// Local branches in alphabetical order.
    pub async fn branches(&self) -> Result<Vec<BranchName>, SyncError> {
        Ok(self.snapshot().await?.branches)
    }

    /// Branch selector entries, with the detached entry when detached.
    pub async fn branch_choices(&self) -> Result<BranchChoices, SyncError> {
        let snapshot = self.snapshot().await?;
        Ok(BranchChoices::build(
            &snapshot.branches,
            snapshot.branch_state.as_ref(),
        ))
    }

    pub async fn merge_in_progress(&self) -> Result<bool, SyncError> {
        Ok(self.snapshot().await?.merge_in_progress)
    }

    /// The single read the presentation layer performs per change.
    pub async fn model(&self) -> Result<ModelData, SyncError> {
        if !self.is_present() {
            return Ok(ModelData::absent());
        }
        let snapshot = self.snapshot().await?;
        Ok(ModelData::assemble(&snapshot, self.operations.snapshot()))
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Switch to `name`, creating it first when `options.create_new`.
    ///
    /// On failure HEAD stays where it was and the cache is left alone.
    pub async fn checkout(
        &self,
        name: &str,
        options: CheckoutOptions,
    ) -> Result<Outcome, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        };
        let branch = BranchName::new(name)?;
        let Some(guard) = self.operations.try_begin(OperationClass::Checkout) else {
            return Ok(busy(OperationClass::Checkout));
        };

        if options.create_new && self.branch_exists(backend, &branch).await? {
            drop(guard);
            return Err(self.surface(SyncError::BranchExists {
                name: branch.to_string(),
            }));
        }

        let mut args = vec!["checkout"];
        if options.create_new {
            args.push("-b");
        }
        args.push(branch.as_str());
        let result = git(backend, &args).await;
        drop(guard);

        match result {
            Ok(_) => {
                log::info!("checked out {branch}");
                self.invalidate();
                Ok(Outcome::Completed)
            }
            Err(err) => Err(self.surface(classify_checkout(err, branch.as_str()))),
        }
    }

    /// Create `name` and switch to it.
    pub async fn create_branch(&self, name: &str) -> Result<Outcome, SyncError> {
        self.checkout(name, CheckoutOptions { create_new: true })
            .await
    }

    /// Fetch the remote the current branch tracks.
    ///
    /// Falls back to the default remote, then to the first remote.
    pub async fn fetch(&self) -> Result<Outcome, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        };
        let Some(guard) = self.operations.try_begin(OperationClass::Fetch) else {
            return Ok(busy(OperationClass::Fetch));
        };

        let head = self.head_branch(backend).await?;
        let Some(remote) = self.remote_for(backend, head.as_ref()).await? else {
            log::debug!("fetch skipped: no remote");
            return Ok(Outcome::Skipped(SkipReason::NoRemote));
        };
        let result = git(backend, &["fetch", &remote]).await;
        drop(guard);

        match result {
            Ok(_) => {
                log::info!("fetched {remote}");
                self.invalidate();
                Ok(Outcome::Completed)
            }
            Err(err) => Err(self.surface(SyncError::Unclassified(err))),
        }
    }

    /// Merge the upstream into the current branch.
    ///
    /// A conflicted merge leaves the working tree as git left it, marks a
    /// merge in progress, and fails with [`SyncError::MergeConflict`].
    pub async fn pull(&self) -> Result<Outcome, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        };
        let Some(guard) = self.operations.try_begin(OperationClass::Pull) else {
            return Ok(busy(OperationClass::Pull));
        };

        match git(backend, &["pull", "--no-rebase", "--no-edit"]).await {
            Ok(_) => {
                drop(guard);
                log::info!("pull completed");
                *self.pending_merge() = None;
                self.invalidate();
                Ok(Outcome::Completed)
            }
            Err(err) => {
                let failure = self.classify_pull_failure(backend, err).await;
                drop(guard);
                let err = match failure {
                    PullFailure::MergeStarted(err) => {
                        self.invalidate();
                        err
                    }
                    PullFailure::Reported(err) => {
                        if let SyncError::MergeConflict { paths } = &err {
                            *self.pending_merge() = Some(PendingMerge {
                                paths: paths.clone(),
                            });
                            self.invalidate();
                        }
                        err
                    }
                };
                Err(self.surface(err))
            }
        }
    }

    /// Push `name` to its upstream, or publish it when it has none.
    pub async fn push(&self, name: &str, options: PushOptions) -> Result<Outcome, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        };
        let branch = BranchName::new(name)?;
        let Some(guard) = self.operations.try_begin(OperationClass::Push) else {
            return Ok(busy(OperationClass::Push));
        };

        let upstream = self.upstream_of(backend, &branch).await?;
        let set_upstream = options.set_upstream || upstream.is_none();
        let Some(remote) = self.remote_for(backend, Some(&branch)).await? else {
            log::debug!("push skipped: no remote");
            return Ok(Outcome::Skipped(SkipReason::NoRemote));
        };

        let mut args = vec!["push"];
        if options.force {
            args.push("--force");
        }
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(&remote);
        args.push(branch.as_str());
        let result = git(backend, &args).await;
        drop(guard);

        match result {
            Ok(_) => {
                log::info!("pushed {branch} to {remote}");
                self.invalidate();
                Ok(Outcome::Completed)
            }
            Err(err) => Err(self.surface(classify_push(err, branch.as_str()))),
        }
    }

    /// Stage `paths`. An empty list does nothing.
    pub async fn stage_files<S: AsRef<str>>(&self, paths: &[S]) -> Result<Outcome, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        };
        if paths.is_empty() {
            return Ok(Outcome::Skipped(SkipReason::NothingToStage));
        }

        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(|p| p.as_ref()));
        match git(backend, &args).await {
            Ok(_) => {
                log::info!("staged {} path(s)", paths.len());
                self.invalidate();
                Ok(Outcome::Completed)
            }
            Err(err) => Err(self.surface(SyncError::Unclassified(err))),
        }
    }

    /// Commit what is staged. Concludes an active merge.
    pub async fn commit(&self, message: &str) -> Result<Outcome, SyncError> {
        let Some(backend) = self.backend.as_deref() else {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        };
        match git(backend, &["commit", "-m", message]).await {
            Ok(_) => {
                log::info!("committed");
                *self.pending_merge() = None;
                self.invalidate();
                Ok(Outcome::Completed)
            }
            Err(err) => Err(self.surface(SyncError::Unclassified(err))),
        }
    }

    /// Run whatever the sync control currently offers.
    pub async fn run_sync_action(&self) -> Result<Outcome, SyncError> {
        if !self.is_present() {
            return Ok(Outcome::Skipped(SkipReason::NotPresent));
        }
        let snapshot = self.snapshot().await?;
        let Some(action) = snapshot.ahead_behind.as_ref().map(display_for).and_then(|d| d.action)
        else {
            return Ok(Outcome::Skipped(SkipReason::Inert));
        };
        if self.operations.is_in_progress(action.class()) {
            return Ok(busy(action.class()));
        }

        let branch = snapshot.branch_state.as_ref().and_then(BranchState::branch);
        match (action, branch) {
            (SyncAction::Fetch, _) => self.fetch().await,
            (SyncAction::Pull, _) => self.pull().await,
            (SyncAction::Push, Some(branch)) => self.push(branch.as_str(), PushOptions::default()).await,
            (SyncAction::Publish, Some(branch)) => {
                self.push(
                    branch.as_str(),
                    PushOptions {
                        force: false,
                        set_upstream: true,
                    },
                )
                .await
            }
            (SyncAction::Push | SyncAction::Publish, None) => {
                Ok(Outcome::Skipped(SkipReason::Inert))
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Notify when classified, log, and hand the error back.
    fn surface(&self, err: SyncError) -> SyncError {
        if let Some(notification) = err.notification() {
            self.notifier.notify(&notification);
        }
        log::debug!("operation failed: {err}");
        err
    }

    async fn compute(&self, backend: &dyn Backend) -> Result<Snapshot, SyncError> {
        let branch_state = self.read_branch_state(backend).await?;
        let branches = self.read_branches(backend).await?;
        let ahead_behind = self.read_ahead_behind(backend, &branch_state).await?;
        let changed = self.read_changed_paths(backend).await?;
        let changed_file_count = changed.len();

        let merge_head = git_test(backend, &["rev-parse", "-q", "--verify", "MERGE_HEAD"]).await?;
        let merge_in_progress = merge_head || self.settle_pending_merge(merge_head, &changed);

        log::debug!(
            "refreshed: {} ({}), {} changed",
            branch_state.name(),
            ahead_behind,
            changed_file_count
        );

        Ok(Snapshot {
            branch_state: Some(branch_state),
            ahead_behind: Some(ahead_behind),
            changed_file_count,
            branches,
            merge_in_progress,
        })
    }

    /// Whether a refused pull still blocks; clears it once it no longer does.
    fn settle_pending_merge(&self, merge_head: bool, changed: &BTreeSet<String>) -> bool {
        let mut pending = self.pending_merge();
        let blocked = !merge_head
            && pending
                .as_ref()
                .is_some_and(|merge| merge.still_blocked(changed));
        if !blocked && pending.take().is_some() {
            log::debug!("pending merge cleared");
        }
        blocked
    }

    async fn head_branch(&self, backend: &dyn Backend) -> Result<Option<BranchName>, SyncError> {
        match git(backend, &["symbolic-ref", "--quiet", "--short", "HEAD"]).await {
            Ok(out) => Ok(Some(BranchName::new(out.stdout.trim())?)),
            Err(err) if err.exit_code() == Some(1) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_branch_state(&self, backend: &dyn Backend) -> Result<BranchState, SyncError> {
        if let Some(branch) = self.head_branch(backend).await? {
            return Ok(BranchState::on_branch(&branch));
        }

        let label = match git(backend, &["describe", "--contains", "--all", "HEAD"]).await {
            Ok(out) => out.stdout.trim().to_string(),
            Err(err) => {
                log::debug!("describe failed, using abbreviated hash: {err}");
                git(backend, &["rev-parse", "--short", "HEAD"])
                    .await?
                    .stdout
                    .trim()
                    .to_string()
            }
        };
        let label = label.strip_prefix("heads/").unwrap_or(&label).to_string();
        Ok(BranchState::detached(label))
    }

    async fn read_branches(&self, backend: &dyn Backend) -> Result<Vec<BranchName>, SyncError> {
        let out = git(backend, &["for-each-ref", "--format=%(refname:short)", "refs/heads/"]).await?;
        let mut branches: Vec<BranchName> = lines(&out.stdout)
            .into_iter()
            .filter_map(|name| match BranchName::new(name.as_str()) {
                Ok(branch) => Some(branch),
                Err(err) => {
                    log::debug!("skipping branch: {err}");
                    None
                }
            })
            .collect();
        branches.sort();
        Ok(branches)
    }

    async fn read_ahead_behind(
        &self,
        backend: &dyn Backend,
        state: &BranchState,
    ) -> Result<AheadBehind, SyncError> {
        let Some(branch) = state.branch() else {
            return Ok(AheadBehind::Detached);
        };
        if self.remotes(backend).await?.is_empty() {
            return Ok(AheadBehind::NoRemote);
        }
        if self.upstream_of(backend, &branch).await?.is_none() {
            return Ok(AheadBehind::NoUpstream);
        }
        match git(backend, &["rev-list", "--left-right", "--count", "HEAD...@{upstream}"]).await {
            Ok(out) => Ok(left_right_count(&out.stdout)
                .map(|(ahead, behind)| AheadBehind::Diverged { ahead, behind })
                .unwrap_or(AheadBehind::Unknown)),
            Err(err) => {
                log::debug!("divergence unknown: {err}");
                Ok(AheadBehind::Unknown)
            }
        }
    }

    async fn read_changed_paths(
        &self,
        backend: &dyn Backend,
    ) -> Result<BTreeSet<String>, SyncError> {
        let untracked = if self.settings.count_untracked {
            "--untracked-files=all"
        } else {
            "--untracked-files=no"
        };
        let out = git(backend, &["status", "--porcelain=v1", untracked]).await?;
        Ok(changed_paths(&out.stdout, self.settings.count_untracked))
    }

    async fn remotes(&self, backend: &dyn Backend) -> Result<Vec<String>, SyncError> {
        Ok(lines(&git(backend, &["remote"]).await?.stdout))
    }

    /// Upstream short name (`origin/main`) of `branch`, if it tracks one.
    async fn upstream_of(
        &self,
        backend: &dyn Backend,
        branch: &BranchName,
    ) -> Result<Option<String>, SyncError> {
        let refname = format!("refs/heads/{branch}");
        let out = git(backend, &["for-each-ref", "--format=%(upstream:short)", &refname]).await?;
        let upstream = out.stdout.trim();
        Ok((!upstream.is_empty()).then(|| upstream.to_string()))
    }

    async fn branch_exists(
        &self,
        backend: &dyn Backend,
        branch: &BranchName,
    ) -> Result<bool, SyncError> {
        let refname = format!("refs/heads/{branch}");
        Ok(git_test(backend, &["rev-parse", "--verify", "--quiet", &refname]).await?)
    }

    /// The remote `branch` tracks, else the default remote, else the first.
    async fn remote_for(
        &self,
        backend: &dyn Backend,
        branch: Option<&BranchName>,
    ) -> Result<Option<String>, SyncError> {
        if let Some(branch) = branch {
            let key = format!("branch.{branch}.remote");
            if let Ok(out) = git(backend, &["config", "--get", &key]).await {
                let remote = out.stdout.trim();
                if !remote.is_empty() {
                    return Ok(Some(remote.to_string()));
                }
            }
        }

        let remotes = self.remotes(backend).await?;
        if remotes.iter().any(|r| r == &self.settings.default_remote) {
            return Ok(Some(self.settings.default_remote.clone()));
        }
        Ok(remotes.into_iter().next())
    }

    /// Prefer git's merge state over output text.
    async fn classify_pull_failure(&self, backend: &dyn Backend, err: BackendError) -> PullFailure {
        match git_test(backend, &["rev-parse", "-q", "--verify", "MERGE_HEAD"]).await {
            Ok(true) => {
                let paths = match git(backend, &["diff", "--name-only", "--diff-filter=U"]).await {
                    Ok(out) => lines(&out.stdout),
                    Err(_) => err
                        .failure()
                        .map(|f| conflict_paths(&f.combined_output()))
                        .unwrap_or_default(),
                };
                PullFailure::MergeStarted(SyncError::MergeConflict { paths })
            }
            Ok(false) | Err(_) => PullFailure::Reported(classify_pull(err)),
        }
    }
}

fn busy(class: OperationClass) -> Outcome {
    log::debug!("{class} already in progress; request ignored");
    Outcome::Skipped(SkipReason::Busy(class))
}

async fn git(backend: &dyn Backend, args: &[&str]) -> Result<BackendOutput, BackendError> {
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    backend.execute(&args).await
}

/// Run a command whose exit status is the answer: 0 is yes, 1 is no.
async fn git_test(backend: &dyn Backend, args: &[&str]) -> Result<bool, BackendError> {
    match git(backend, args).await {
        Ok(_) => Ok(true),
        Err(err) if err.exit_code() == Some(1) => Ok(false),
        Err(err) => Err(err),
    }
}
