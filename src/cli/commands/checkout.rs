//! checkout command - Switch branches

use anyhow::Result;

use crate::cli::Context;
use crate::sync::CheckoutOptions;

/// Check out `name`, creating it first when `create` is set.
pub fn checkout(ctx: &Context, name: &str, create: bool) -> Result<()> {
    super::block_on(checkout_async(ctx, name, create))
}

async fn checkout_async(ctx: &Context, name: &str, create: bool) -> Result<()> {
    let session = ctx.open()?;
    let outcome = session
        .repo
        .checkout(name, CheckoutOptions { create_new: create })
        .await?;
    let what = if create {
        format!("Switched to a new branch '{name}'")
    } else {
        format!("Switched to branch '{name}'")
    };
    super::report(ctx, &what, outcome)
}
