//! sync commands - fetch, pull, push and the primary sync action

use std::sync::Arc;

use anyhow::Result;

use crate::cli::Context;
use crate::sync::{display_for, CommandDispatcher, PushOptions};
use crate::ui::output;
use crate::ui::prompts::{Confirm, Decision, FixedConfirm, TerminalConfirm};

/// Fetch the tracking remote.
pub fn fetch(ctx: &Context) -> Result<()> {
    super::block_on(fetch_async(ctx))
}

async fn fetch_async(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let outcome = session.repo.fetch().await?;
    super::report(ctx, "Fetched", outcome)
}

/// Merge upstream changes.
pub fn pull(ctx: &Context) -> Result<()> {
    super::block_on(pull_async(ctx))
}

async fn pull_async(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let outcome = session.repo.pull().await?;
    super::report(ctx, "Pulled", outcome)
}

/// Push the current branch.
///
/// `--force` is confirmed unless `--yes` was given or confirmation is
/// disabled in config.
pub fn push(ctx: &Context, force: bool, set_upstream: bool, yes: bool) -> Result<()> {
    super::block_on(push_async(ctx, force, set_upstream, yes))
}

async fn push_async(ctx: &Context, force: bool, set_upstream: bool, yes: bool) -> Result<()> {
    let session = ctx.open()?;
    let confirm: Arc<dyn Confirm> = if yes {
        Arc::new(FixedConfirm(Decision::Accept))
    } else {
        Arc::new(TerminalConfirm::new(session.interactive))
    };
    let dispatcher = CommandDispatcher::new(Arc::clone(&session.repo), confirm)
        .with_force_push_confirmation(session.config.confirm_force_push());

    let outcome = dispatcher
        .push(PushOptions {
            force,
            set_upstream,
        })
        .await?;
    let what = if force { "Force pushed" } else { "Pushed" };
    super::report(ctx, what, outcome)
}

/// Run whatever the sync line offers.
pub fn sync(ctx: &Context) -> Result<()> {
    super::block_on(sync_async(ctx))
}

async fn sync_async(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let label = session
        .repo
        .ahead_behind()
        .await?
        .map(|ab| display_for(&ab).label)
        .unwrap_or_else(|| "Sync".to_string());

    let outcome = session.repo.run_sync_action().await?;
    super::report(ctx, &format!("{label}: done"), outcome)?;

    if outcome.is_completed() && !ctx.json {
        if let Some(sync) = session.repo.model().await?.sync {
            output::print(format!("Sync: {}", sync.label), ctx.verbosity);
        }
    }
    Ok(())
}
