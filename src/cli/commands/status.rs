//! status command - Show branch, sync state and changed files

use anyhow::Result;

use crate::cli::Context;
use crate::sync::ModelData;
use crate::ui::output;

/// Show the repository model.
pub fn status(ctx: &Context) -> Result<()> {
    super::block_on(status_async(ctx))
}

async fn status_async(ctx: &Context) -> Result<()> {
    let session = ctx.open()?;
    let model = session.repo.model().await?;

    if ctx.json {
        output::json(&model)?;
        return Ok(());
    }
    if !model.present {
        output::warn("not inside a git working tree", ctx.verbosity);
        return Ok(());
    }
    output::print(render(&model), ctx.verbosity);
    Ok(())
}

fn render(model: &ModelData) -> String {
    let mut lines = Vec::new();

    if let Some(state) = &model.branch_state {
        if state.is_detached() {
            lines.push(format!("HEAD detached at {}", state.name()));
        } else {
            lines.push(format!("On branch {}", state.name()));
        }
    }

    if let Some(sync) = &model.sync {
        let note = if sync.is_inert() {
            ""
        } else if model.sync_enabled {
            " (gsync sync)"
        } else {
            " (in progress)"
        };
        lines.push(format!("Sync: {}{note}", sync.label));
    }

    lines.push(format!("Changed files: {}", model.changed_file_count));

    if model.merge_in_progress {
        lines.push("Merge in progress: resolve conflicts and commit".to_string());
    }

    lines.join("\n")
}
