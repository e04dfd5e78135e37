//! Validate command - check the test table.

use super::{Context, success, warn};
use crate::error::{CliError, CliResult};
use tagsmith_config::ConfigValidator;

pub fn run(ctx: &Context) -> CliResult<()> {
    let config = ctx.load_config()?;
    let problems = ConfigValidator::problems(&config);

    println!();
    println!(
        "  {} tests, {} variants",
        config.tests.len(),
        config.variant_count()
    );

    if problems.is_empty() {
        success("Test table is valid");
        return Ok(());
    }

    for problem in &problems {
        warn(problem);
    }

    Err(CliError::Validation(format!(
        "{} problem(s) found",
        problems.len()
    )))
}
