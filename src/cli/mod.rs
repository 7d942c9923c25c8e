//! cli
//!
//! Command-line interface layer for gsync.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialize logging
//! - Open the repository with the right configuration and collaborators
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It is one presentation layer over
//! [`crate::sync::Repository`]: it reads the model, issues operation
//! requests, and prints what comes back. Repository state changes flow
//! through the repository only.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::git::discover;
use crate::sync::Repository;
use crate::ui::notify::TerminalNotifier;
use crate::ui::output::Verbosity;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        json: cli.json,
        interactive: cli.interactive_override(),
    };

    commands::dispatch(cli.command, &ctx)
}

/// `--debug` forces debug output; otherwise `RUST_LOG` decides, defaulting
/// to warnings.
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // a second init (tests calling run twice) is harmless
    let _ = builder.try_init();
}

/// Settings derived from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory to run in, if not the current one
    pub cwd: Option<PathBuf>,
    pub verbosity: Verbosity,
    pub json: bool,
    /// Interactivity forced by flags; `None` defers to config and the terminal
    pub interactive: Option<bool>,
}

/// An opened repository with the configuration it was opened with.
pub struct Session {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub interactive: bool,
}

impl Context {
    pub(crate) fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Load configuration and open the repository at the working directory.
    pub fn open(&self) -> Result<Session> {
        let cwd = self.cwd()?;
        let info = discover(&cwd).context("Failed to open repository")?;
        let config = Config::load(info.as_ref().map(|i| i.work_dir.as_path()))
            .context("Failed to load configuration")?;
        log::debug!(
            "config loaded (global: {:?}, repo: {:?})",
            config.global_config_loaded_from(),
            config.repo_config_loaded_from()
        );

        let notifier = Arc::new(TerminalNotifier::new(self.verbosity));
        let repo = Repository::from_info(info, &config, notifier);

        let interactive = self
            .interactive
            .unwrap_or_else(|| config.interactive() && args::stdin_is_terminal());

        Ok(Session {
            repo: Arc::new(repo),
            config,
            interactive,
        })
    }
}
