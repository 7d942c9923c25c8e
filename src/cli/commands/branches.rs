//! branches command - List local branches

use anyhow::Result;

use crate::cli::Context;
use crate::sync::BranchChoices;
use crate::ui::output;

/// List local branches, marking the current one.
pub fn branches(ctx: &Context) -> Result<()> {
    super::block_on(branches_async(ctx))
}

async fn branches_async(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let choices = session.repo.branch_choices().await?;

    if ctx.json {
        output::json(&choices)?;
    } else if !session.repo.is_present() {
        output::warn("not inside a git working tree", ctx.verbosity);
    } else {
        output::print(render(&choices), ctx.verbosity);
    }
    Ok(())
}

fn render(choices: &BranchChoices) -> String {
    choices
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if choices.selected == Some(i) { "* " } else { "  " };
            if entry.disabled {
                format!("{marker}({})", entry.label)
            } else {
                format!("{marker}{}", entry.label)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
