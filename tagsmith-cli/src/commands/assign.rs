//! Assign command - move the visitor into a variant.

use super::{Context, info, success};
use crate::error::{CliError, CliResult};
use tagsmith_features::BoundaryTable;

pub fn run(ctx: &Context, variant: &str) -> CliResult<()> {
    // Checked before the page load, which would persist a fresh factor.
    if BoundaryTable::new(&ctx.load_config()?).slot(variant).is_none() {
        return Err(CliError::InvalidArgument(format!("unknown variant {}", variant)));
    }

    let mut engine = ctx.page_load(true)?;
    let previous = engine.user_variant().unwrap_or("none").to_string();

    let factor = engine.activate_variant(variant)?;

    info(&format!("previous variant: {}", previous));
    success(&format!(
        "Assigned to {} (factor {}) in {}",
        variant,
        factor,
        ctx.state_path().display()
    ));
    Ok(())
}
