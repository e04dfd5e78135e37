//! Status command - the debug status table.

use super::Context;
use crate::error::{CliError, CliResult};
use colored::Colorize;
use tagsmith_features::{DebugSnapshot, format_percentage};

/// Show every test and variant, marking the visitor's.
pub fn run(ctx: &Context, json: bool) -> CliResult<()> {
    let engine = ctx.page_load(true)?;
    let snapshot = engine
        .snapshot()
        .ok_or_else(|| CliError::Engine("debug snapshot unavailable".to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_table(&snapshot, engine.factor());
    }

    Ok(())
}

fn print_table(snapshot: &DebugSnapshot, factor: f64) {
    println!();
    println!(
        "  {} {}  {} {}",
        "Variant:".bright_white().bold(),
        snapshot
            .user_variant
            .as_deref()
            .unwrap_or("none")
            .cyan(),
        "Factor:".bright_white().bold(),
        factor
    );
    println!();

    for test in &snapshot.tests {
        println!(
            "  {} {}",
            test.name.bright_white().bold(),
            format_percentage(test.percentage).dimmed()
        );

        for variant in &test.variants {
            let label = format!("{:<14}", variant.name);
            let label = if variant.active {
                label.green().bold()
            } else {
                label.normal()
            };
            let marker = if variant.active { "●" } else { " " };

            println!(
                "    {} {} {:>8}  {}",
                marker.green(),
                label,
                format_percentage(variant.percentage),
                variant.feature.as_deref().unwrap_or("").cyan()
            );
        }
    }

    println!();
}
