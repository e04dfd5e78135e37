//! Reset command - forget the visitor's factor.

use super::{Context, success};
use crate::error::CliResult;
use tagsmith_features::{FACTOR_KEY, FactorStore};

pub fn run(ctx: &Context) -> CliResult<()> {
    let mut store = ctx.open_store()?;
    store.remove(FACTOR_KEY)?;

    success("Factor cleared; the next run draws a new variant");
    Ok(())
}
