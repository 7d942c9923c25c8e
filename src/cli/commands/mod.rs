//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository through [`Context::open`]
//! 2. Calls the repository (or the command dispatcher) to do the work
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Repository operations are async because they wait on git subprocesses.
//! Handlers are synchronous wrappers that run the async implementation on
//! a tokio runtime.

mod branches;
mod checkout;
mod completion;
mod stage;
mod status;
mod sync;

pub use branches::branches;
pub use checkout::checkout;
pub use completion::completion;
pub use stage::{commit, stage};
pub use status::status;
pub use sync::{fetch, pull, push, sync};

use anyhow::Result;

use crate::cli::args::Command;
use crate::cli::Context;
use crate::sync::Outcome;
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Status => status(ctx),
        Command::Branches => branches(ctx),
        Command::Checkout { name, create } => checkout(ctx, &name, create),
        Command::Fetch => fetch(ctx),
        Command::Pull => pull(ctx),
        Command::Push {
            force,
            set_upstream,
            yes,
        } => push(ctx, force, set_upstream, yes),
        Command::Sync => sync(ctx),
        Command::Stage { paths } => stage(ctx, &paths),
        Command::Commit { message } => commit(ctx, &message),
        Command::Completion { shell } => completion(shell),
    }
}

/// Run an async command body to completion.
pub(crate) fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

/// Print how an operation ended.
pub(crate) fn report(ctx: &Context, what: &str, outcome: Outcome) -> Result<()> {
    if ctx.json {
        output::json(&outcome)?;
        return Ok(());
    }
    match outcome {
        Outcome::Completed => output::success(what, ctx.verbosity),
        Outcome::Skipped(reason) => {
            output::warn(format!("{what} skipped: {reason}"), ctx.verbosity)
        }
    }
    Ok(())
}
