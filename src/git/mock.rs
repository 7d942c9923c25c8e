//! git::mock
//!
//! In-memory backend for deterministic testing.
//!
//! # Design
//!
//! `MockBackend` simulates the handful of git commands the synchronization
//! core issues: branches, HEAD, remotes, upstream tracking, ahead/behind
//! counts, porcelain status and merge state. It records every invocation,
//! can be configured to fail specific commands with realistic git output,
//! and can park a command mid-flight with a [`Hold`] so tests can observe
//! the in-progress state.
//!
//! # Example
//!
//! ```
//! use gitsync::git::mock::MockBackend;
//! use gitsync::git::Backend;
//!
//! # tokio_test::block_on(async {
//! let backend = MockBackend::new()
//!     .with_branches(&["develop"])
//!     .with_remote("origin")
//!     .with_upstream("main", "origin/main", 0, 2);
//!
//! let out = backend
//!     .execute(&["rev-list".into(), "--left-right".into(), "--count".into(), "HEAD...@{upstream}".into()])
//!     .await
//!     .unwrap();
//! assert_eq!(out.stdout.trim(), "0\t2");
//! assert_eq!(backend.count("rev-list"), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::backend::{Backend, BackendError, BackendOutput, CommandFailure};

/// Mock git backend.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<MockGitInner>>,
}

/// Where the simulated HEAD points.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MockHead {
    Branch(String),
    /// Detached, with the label `git describe --contains --all` reports.
    Detached(String),
}

/// One porcelain status entry.
#[derive(Debug, Clone)]
struct StatusEntry {
    index: char,
    worktree: char,
    path: String,
}

#[derive(Debug)]
struct MockGitInner {
    branches: BTreeSet<String>,
    head: MockHead,
    remotes: Vec<String>,
    /// Branch name to upstream short name (`origin/main`).
    upstreams: HashMap<String, String>,
    /// Branch name to `(ahead, behind)`.
    divergence: HashMap<String, (u32, u32)>,
    status: Vec<StatusEntry>,
    merge_head: bool,
    fail_on: Vec<FailOn>,
    holds: HashMap<String, Hold>,
    invocations: Vec<Vec<String>>,
}

/// Configuration for which command should fail.
///
/// Failures persist until [`MockBackend::clear_fail_on`] is called.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail `checkout` with the given failure.
    Checkout(CommandFailure),
    /// Fail `fetch` with the given failure.
    Fetch(CommandFailure),
    /// Fail `pull` with the given failure.
    Pull(CommandFailure),
    /// Fail `pull` as a conflicted merge of the given paths, leaving
    /// `MERGE_HEAD` and unmerged entries behind like git does.
    PullConflict(Vec<String>),
    /// Fail `push` with the given failure.
    Push(CommandFailure),
    /// Fail `add` with the given failure.
    Add(CommandFailure),
    /// Fail `commit` with the given failure.
    Commit(CommandFailure),
}

impl FailOn {
    /// `git push` rejected as non-fast-forward.
    pub fn push_rejected(remote: &str, branch: &str) -> Self {
        FailOn::Push(CommandFailure::new(
            &["push", remote, branch],
            1,
            format!(
                "To /srv/{remote}.git\n ! [rejected]        {branch} -> {branch} (fetch first)\n\
                 error: failed to push some refs to '/srv/{remote}.git'\n\
                 hint: Updates were rejected because the remote contains work that you do\n\
                 hint: not have locally. This is usually caused by another repository pushing\n\
                 hint: to the same ref. You may want to first integrate the remote changes\n\
                 hint: (e.g., 'git pull ...') before pushing again.\n"
            ),
        ))
    }

    /// `git checkout` refused because local changes would be overwritten.
    pub fn checkout_overwrite(branch: &str, paths: &[&str]) -> Self {
        let listed: String = paths.iter().map(|p| format!("\t{p}\n")).collect();
        FailOn::Checkout(CommandFailure::new(
            &["checkout", branch],
            1,
            format!(
                "error: Your local changes to the following files would be overwritten by checkout:\n\
                 {listed}Please commit your changes or stash them before you switch branches.\n\
                 Aborting\n"
            ),
        ))
    }

    fn command(&self) -> &'static str {
        match self {
            FailOn::Checkout(_) => "checkout",
            FailOn::Fetch(_) => "fetch",
            FailOn::Pull(_) | FailOn::PullConflict(_) => "pull",
            FailOn::Push(_) => "push",
            FailOn::Add(_) => "add",
            FailOn::Commit(_) => "commit",
        }
    }
}

/// Parks the next invocation of a command until released.
#[derive(Debug, Clone, Default)]
pub struct Hold {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl Hold {
    /// Wait until the held command has been invoked.
    pub async fn started(&self) {
        self.started.notified().await;
    }

    /// Let the held command finish.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

impl MockBackend {
    /// A repository on `main` with no remotes and a clean working tree.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockGitInner {
                branches: BTreeSet::from(["main".to_string()]),
                head: MockHead::Branch("main".to_string()),
                remotes: Vec::new(),
                upstreams: HashMap::new(),
                divergence: HashMap::new(),
                status: Vec::new(),
                merge_head: false,
                fail_on: Vec::new(),
                holds: HashMap::new(),
                invocations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockGitInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add local branches.
    pub fn with_branches(self, names: &[&str]) -> Self {
        self.lock()
            .branches
            .extend(names.iter().map(|s| s.to_string()));
        self
    }

    /// Add a remote.
    pub fn with_remote(self, name: &str) -> Self {
        self.lock().remotes.push(name.to_string());
        self
    }

    /// Make `branch` track `upstream` with the given divergence.
    pub fn with_upstream(self, branch: &str, upstream: &str, ahead: u32, behind: u32) -> Self {
        {
            let mut inner = self.lock();
            inner.branches.insert(branch.to_string());
            inner
                .upstreams
                .insert(branch.to_string(), upstream.to_string());
            inner
                .divergence
                .insert(branch.to_string(), (ahead, behind));
        }
        self
    }

    /// Add a porcelain status entry, e.g. `(" M", "src/lib.rs")`.
    pub fn with_status(self, code: &str, path: &str) -> Self {
        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');
        self.lock().status.push(StatusEntry {
            index,
            worktree,
            path: path.to_string(),
        });
        self
    }

    /// Detach HEAD; `label` is what describe reports.
    pub fn detached_at(self, label: &str) -> Self {
        self.lock().head = MockHead::Detached(label.to_string());
        self
    }

    /// Configure the mock to fail a command.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on.push(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on.clear();
    }

    /// Park the next invocation of `command` until the returned hold is released.
    pub fn hold(&self, command: &str) -> Hold {
        let hold = Hold::default();
        self.lock().holds.insert(command.to_string(), hold.clone());
        hold
    }

    /// Change divergence behind the core's back (e.g. someone else pushed).
    pub fn set_divergence(&self, branch: &str, ahead: u32, behind: u32) {
        self.lock()
            .divergence
            .insert(branch.to_string(), (ahead, behind));
    }

    /// Add a status entry behind the core's back (e.g. an editor saved a file).
    pub fn touch(&self, code: &str, path: &str) {
        let mut chars = code.chars();
        let index = chars.next().unwrap_or(' ');
        let worktree = chars.next().unwrap_or(' ');
        self.lock().status.push(StatusEntry {
            index,
            worktree,
            path: path.to_string(),
        });
    }

    /// Abort a merge behind the core's back (`git merge --abort`).
    pub fn abort_merge(&self) {
        let mut inner = self.lock();
        inner.merge_head = false;
        inner.status.retain(|e| e.index != 'U' && e.worktree != 'U');
    }

    /// Drop a path's status behind the core's back (stash, checkout).
    pub fn discard(&self, path: &str) {
        self.lock().status.retain(|e| e.path != path);
    }

    /// All recorded invocations.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.lock().invocations.clone()
    }

    /// Number of recorded invocations of `command`.
    pub fn count(&self, command: &str) -> usize {
        self.lock()
            .invocations
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some(command))
            .count()
    }

    /// Clear recorded invocations.
    pub fn clear_invocations(&self) {
        self.lock().invocations.clear();
    }

    /// Currently checked-out branch, if attached.
    pub fn head_branch(&self) -> Option<String> {
        match &self.lock().head {
            MockHead::Branch(name) => Some(name.clone()),
            MockHead::Detached(_) => None,
        }
    }

    /// Whether the simulated repository is mid-merge.
    pub fn merge_head(&self) -> bool {
        self.lock().merge_head
    }

    /// Upstream short name of `branch`.
    pub fn upstream_of(&self, branch: &str) -> Option<String> {
        self.lock().upstreams.get(branch).cloned()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn ok(stdout: impl Into<String>) -> Result<BackendOutput, BackendError> {
    Ok(BackendOutput::stdout(stdout))
}

fn fail(args: &[String], code: i32, stderr: impl Into<String>) -> Result<BackendOutput, BackendError> {
    Err(BackendError::Failed(CommandFailure {
        args: args.to_vec(),
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.into(),
    }))
}

fn has_flag(args: &[String], flags: &[&str]) -> bool {
    args.iter().any(|a| flags.contains(&a.as_str()))
}

impl MockGitInner {
    fn configured_failure(&self, command: &str) -> Option<FailOn> {
        self.fail_on.iter().find(|f| f.command() == command).cloned()
    }

    fn current_branch(&self) -> Option<&str> {
        match &self.head {
            MockHead::Branch(name) => Some(name),
            MockHead::Detached(_) => None,
        }
    }

    fn run(&mut self, args: &[String]) -> Result<BackendOutput, BackendError> {
        let command = args.first().map(String::as_str).unwrap_or_default();
        let last = args.last().map(String::as_str).unwrap_or_default();

        if let Some(failure) = self.configured_failure(command) {
            return self.run_failure(args, failure);
        }

        match command {
            "symbolic-ref" => match &self.head {
                MockHead::Branch(name) => ok(format!("{name}\n")),
                MockHead::Detached(_) => fail(args, 1, ""),
            },
            "describe" => match &self.head {
                MockHead::Branch(name) => ok(format!("{name}\n")),
                MockHead::Detached(label) => ok(format!("{label}\n")),
            },
            "rev-parse" => self.rev_parse(args, last),
            "for-each-ref" => self.for_each_ref(args, last),
            "remote" => ok(self.remotes.iter().map(|r| format!("{r}\n")).collect::<String>()),
            "config" => {
                let remote = last
                    .strip_prefix("branch.")
                    .and_then(|rest| rest.strip_suffix(".remote"))
                    .and_then(|branch| self.upstreams.get(branch))
                    .and_then(|upstream| upstream.split_once('/'))
                    .map(|(remote, _)| remote.to_string());
                match remote {
                    Some(remote) => ok(format!("{remote}\n")),
                    None => fail(args, 1, ""),
                }
            }
            "rev-list" => {
                let Some(branch) = self.current_branch() else {
                    return fail(args, 128, "fatal: HEAD does not point to a branch");
                };
                if !self.upstreams.contains_key(branch) {
                    return fail(args, 128, format!("fatal: no upstream configured for branch '{branch}'"));
                }
                let (ahead, behind) = self.divergence.get(branch).copied().unwrap_or((0, 0));
                ok(format!("{ahead}\t{behind}\n"))
            }
            "status" => {
                let include_untracked = !has_flag(args, &["--untracked-files=no"]);
                let out: String = self
                    .status
                    .iter()
                    .filter(|e| include_untracked || !(e.index == '?' && e.worktree == '?'))
                    .map(|e| format!("{}{} {}\n", e.index, e.worktree, e.path))
                    .collect();
                ok(out)
            }
            "diff" => {
                let out: String = self
                    .status
                    .iter()
                    .filter(|e| e.index == 'U' || e.worktree == 'U')
                    .map(|e| format!("{}\n", e.path))
                    .collect();
                ok(out)
            }
            "checkout" => self.checkout(args, last),
            "fetch" => ok(""),
            "pull" => self.pull(),
            "push" => self.push(args),
            "add" => self.add(args),
            "commit" => self.commit(args),
            _ => fail(args, 1, format!("mock: unsupported command '{command}'")),
        }
    }

    fn run_failure(&mut self, args: &[String], failure: FailOn) -> Result<BackendOutput, BackendError> {
        match failure {
            FailOn::PullConflict(paths) => {
                self.merge_head = true;
                let mut stdout = String::new();
                for path in &paths {
                    stdout.push_str(&format!(
                        "Auto-merging {path}\nCONFLICT (content): Merge conflict in {path}\n"
                    ));
                    self.status.retain(|e| &e.path != path);
                    self.status.push(StatusEntry {
                        index: 'U',
                        worktree: 'U',
                        path: path.clone(),
                    });
                }
                stdout.push_str("Automatic merge failed; fix conflicts and then commit the result.\n");
                Err(BackendError::Failed(CommandFailure {
                    args: args.to_vec(),
                    exit_code: Some(1),
                    stdout,
                    stderr: String::new(),
                }))
            }
            FailOn::Checkout(f)
            | FailOn::Fetch(f)
            | FailOn::Pull(f)
            | FailOn::Push(f)
            | FailOn::Add(f)
            | FailOn::Commit(f) => Err(BackendError::Failed(CommandFailure {
                args: args.to_vec(),
                ..f
            })),
        }
    }

    fn rev_parse(&self, args: &[String], last: &str) -> Result<BackendOutput, BackendError> {
        if last == "MERGE_HEAD" {
            return if self.merge_head {
                ok("4b825dc642cb6eb9a060e54bf8d69288fbee4904\n")
            } else {
                fail(args, 1, "")
            };
        }
        if let Some(branch) = last.strip_prefix("refs/heads/") {
            return if self.branches.contains(branch) {
                ok("1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d\n")
            } else {
                fail(args, 1, "")
            };
        }
        ok("1a2b3c4\n")
    }

    fn for_each_ref(&self, args: &[String], last: &str) -> Result<BackendOutput, BackendError> {
        let wants_upstream = args.iter().any(|a| a.contains("%(upstream"));
        if wants_upstream {
            let branch = last.strip_prefix("refs/heads/").unwrap_or(last);
            let upstream = self.upstreams.get(branch).cloned().unwrap_or_default();
            return ok(format!("{upstream}\n"));
        }
        ok(self.branches.iter().map(|b| format!("{b}\n")).collect::<String>())
    }

    fn checkout(&mut self, args: &[String], last: &str) -> Result<BackendOutput, BackendError> {
        let create = has_flag(args, &["-b"]);
        if create {
            if self.branches.contains(last) {
                return fail(args, 128, format!("fatal: a branch named '{last}' already exists\n"));
            }
            self.branches.insert(last.to_string());
        } else if !self.branches.contains(last) {
            return fail(
                args,
                1,
                format!("error: pathspec '{last}' did not match any file(s) known to git\n"),
            );
        }
        self.head = MockHead::Branch(last.to_string());
        ok("")
    }

    fn pull(&mut self) -> Result<BackendOutput, BackendError> {
        if let Some(branch) = self.current_branch().map(str::to_string) {
            let entry = self.divergence.entry(branch).or_insert((0, 0));
            *entry = match *entry {
                (0, _) => (0, 0),
                (ahead, 0) => (ahead, 0),
                // merge commit on top of local work
                (ahead, _) => (ahead + 1, 0),
            };
        }
        self.merge_head = false;
        ok("Updating 1a2b3c4..5d6e7f8\nFast-forward\n")
    }

    fn push(&mut self, args: &[String]) -> Result<BackendOutput, BackendError> {
        let positional: Vec<&String> = args[1..].iter().filter(|a| !a.starts_with('-')).collect();
        let (Some(remote), Some(branch)) = (positional.first(), positional.get(1)) else {
            return fail(args, 128, "fatal: mock push needs <remote> <branch>");
        };
        if !self.remotes.iter().any(|r| r == *remote) {
            return fail(
                args,
                128,
                format!("fatal: '{remote}' does not appear to be a git repository"),
            );
        }
        if has_flag(args, &["--set-upstream", "-u"]) {
            self.upstreams
                .insert(branch.to_string(), format!("{remote}/{branch}"));
        }
        let entry = self.divergence.entry(branch.to_string()).or_insert((0, 0));
        // a force push replaces the remote history with ours
        *entry = (0, if has_flag(args, &["--force"]) { 0 } else { entry.1 });
        ok("")
    }

    fn add(&mut self, args: &[String]) -> Result<BackendOutput, BackendError> {
        let paths: Vec<&String> = match args.iter().position(|a| a == "--") {
            Some(i) => args[i + 1..].iter().collect(),
            None => args[1..].iter().collect(),
        };
        for entry in self.status.iter_mut() {
            if !paths.iter().any(|p| **p == entry.path) {
                continue;
            }
            (entry.index, entry.worktree) = match (entry.index, entry.worktree) {
                ('?', '?') => ('A', ' '),
                ('U', _) | (_, 'U') => ('M', ' '),
                (index, ' ') => (index, ' '),
                (_, worktree) => (worktree, ' '),
            };
        }
        ok("")
    }

    fn commit(&mut self, args: &[String]) -> Result<BackendOutput, BackendError> {
        let staged = self
            .status
            .iter()
            .filter(|e| e.index != ' ' && e.index != '?')
            .count();
        if staged == 0 && !self.merge_head {
            return Err(BackendError::Failed(
                CommandFailure {
                    args: args.to_vec(),
                    exit_code: Some(1),
                    stdout: String::new(),
                    stderr: String::new(),
                }
                .with_stdout("nothing to commit, working tree clean\n"),
            ));
        }
        self.status.retain(|e| e.worktree != ' ' || e.index == '?');
        for entry in self.status.iter_mut() {
            if entry.index != '?' {
                entry.index = ' ';
            }
        }
        self.merge_head = false;
        if let Some(branch) = self.current_branch().map(str::to_string) {
            if self.upstreams.contains_key(&branch) {
                self.divergence.entry(branch).or_insert((0, 0)).0 += 1;
            }
        }
        ok("")
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn execute(&self, args: &[String]) -> Result<BackendOutput, BackendError> {
        let command = args.first().cloned().unwrap_or_default();
        let hold = {
            let mut inner = self.lock();
            inner.invocations.push(args.to_vec());
            inner.holds.remove(&command)
        };

        if let Some(hold) = hold {
            hold.started.notify_one();
            hold.release.notified().await;
        }

        self.lock().run(args)
    }
}
