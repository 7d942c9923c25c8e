//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--json`: Machine-readable output
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// gsync - keep a working tree in step with its remote
#[derive(Parser, Debug)]
#[command(name = "gsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gsync was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Interactivity forced by flags, if any.
    ///
    /// `--interactive` wins; `--no-interactive` and `--quiet` disable.
    pub fn interactive_override(&self) -> Option<bool> {
        if self.interactive_flag {
            Some(true)
        } else if self.no_interactive || self.quiet {
            Some(false)
        } else {
            None
        }
    }
}

/// Whether stdin is attached to a terminal.
pub fn stdin_is_terminal() -> bool {
    std::io::stdin().is_terminal()
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show branch, sync state and changed files
    #[command(
        name = "status",
        long_about = "Show the current branch, how it relates to its upstream, and how many \
            files have changes.\n\n\
            The sync line shows the action `gsync sync` would take: Fetch, Push N, \
            Pull N, N Pull M (both ahead and behind; pull first), Publish (no upstream \
            yet), or an inert state such as No remote or Not on branch.",
        after_help = "\
EXAMPLES:
    # Human-readable summary
    gsync status

    # Full model for scripts and editors
    gsync status --json"
    )]
    Status,

    /// List local branches
    #[command(
        name = "branches",
        long_about = "List local branches alphabetically. The current branch is marked \
            with an asterisk. With a detached HEAD, a disabled entry naming the \
            checked-out commit is shown first."
    )]
    Branches,

    /// Switch branches, or create one with -b
    #[command(
        name = "checkout",
        after_help = "\
EXAMPLES:
    # Switch to an existing branch
    gsync checkout develop

    # Create a branch and switch to it
    gsync checkout -b feature/login"
    )]
    Checkout {
        /// Branch to check out
        name: String,

        /// Create the branch first
        #[arg(short = 'b', long = "create")]
        create: bool,
    },

    /// Fetch the remote the current branch tracks
    Fetch,

    /// Merge upstream changes into the current branch
    #[command(
        name = "pull",
        long_about = "Merge upstream changes into the current branch.\n\n\
            If the merge stops on conflicts, the working tree is left as git left it \
            and the repository reports a merge in progress until you resolve the \
            conflicts and commit."
    )]
    Pull,

    /// Push the current branch, publishing it if it has no upstream
    #[command(
        name = "push",
        after_help = "\
EXAMPLES:
    # Push (or publish) the current branch
    gsync push

    # Overwrite the remote branch; asks for confirmation
    gsync push --force

    # Same, without asking
    gsync push --force --yes"
    )]
    Push {
        /// Overwrite the remote branch even if it is not a fast-forward
        #[arg(long)]
        force: bool,

        /// Record the remote branch as upstream
        #[arg(short = 'u', long)]
        set_upstream: bool,

        /// Skip the force-push confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Run the action shown on the sync line
    Sync,

    /// Stage paths for the next commit
    Stage {
        /// Paths to stage
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Commit staged changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    gsync completion bash >> ~/.bashrc

    # Zsh
    gsync completion zsh > ~/.zfunc/_gsync

    # Fish
    gsync completion fish > ~/.config/fish/completions/gsync.fish

    # PowerShell
    gsync completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
