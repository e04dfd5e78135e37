//! Resolve command - print the visitor's variant.

use super::Context;
use crate::error::{CliError, CliResult};
use tagsmith_features::BoundaryTable;

/// Print the variant for `factor`, or for the visitor in the state file.
///
/// Prints `none` when the factor lies past every boundary.
pub fn run(ctx: &Context, factor: Option<f64>) -> CliResult<()> {
    let variant = match factor {
        Some(factor) => {
            if !(0.0..1.0).contains(&factor) {
                return Err(CliError::InvalidArgument(format!(
                    "factor {} is outside [0, 1)",
                    factor
                )));
            }
            let table = BoundaryTable::new(&ctx.load_config()?);
            table.lookup(factor).map(|slot| slot.label.clone())
        }
        None => ctx.page_load(false)?.user_variant().map(str::to_string),
    };

    println!("{}", variant.as_deref().unwrap_or("none"));
    Ok(())
}
