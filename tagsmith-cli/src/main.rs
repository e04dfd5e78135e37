//! Tagsmith CLI - inspect and steer A/B bucketing from the terminal.
//!
//! Each invocation is one page load over a JSON state file, so the visitor
//! keeps its variant between runs.
//!
//! # Commands
//!
//! - `tagsmith resolve` - Print the visitor's variant
//! - `tagsmith status` - Show the debug status table
//! - `tagsmith assign <variant>` - Move the visitor into a variant
//! - `tagsmith reset` - Forget the visitor's factor
//! - `tagsmith validate` - Check the test table

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod error;

use commands::{Context, assign, reset, resolve, status, validate};
use error::CliResult;

/// Tagsmith CLI - A/B bucketing tools
#[derive(Parser)]
#[command(name = "tagsmith")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Resolve, inspect and assign Tagsmith A/B variants")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} tagsmith resolve\n  {} tagsmith resolve --factor 0.07\n  {} tagsmith assign test1_exp1\n  {} tagsmith status --json",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Test table file (JSON or TOML); the built-in table when omitted
    #[arg(short, long, global = true, env = "TAGSMITH_AB_CONFIG")]
    config: Option<PathBuf>,

    /// State file holding the visitor's factor
    #[arg(
        short,
        long,
        global = true,
        env = "TAGSMITH_STATE",
        default_value = ".tagsmith-state.json"
    )]
    state: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the visitor's variant
    #[command(alias = "r")]
    Resolve {
        /// Map this factor instead of reading the state file
        #[arg(short, long)]
        factor: Option<f64>,
    },

    /// Show tests, variants and the visitor's position
    #[command(alias = "s")]
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign the visitor to a variant
    #[command(alias = "a")]
    Assign {
        /// Variant label, e.g. test1_exp1
        variant: String,
    },

    /// Clear the persisted factor
    Reset,

    /// Validate the test table
    #[command(visible_alias = "check")]
    Validate,
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.verbose {
        tagsmith_log::set_debug(true);
        tagsmith_log::install_log_bridge();
    }

    let ctx = Context::new(cli.config, cli.state);

    let result: CliResult<()> = match cli.command {
        Commands::Resolve { factor } => resolve::run(&ctx, factor),
        Commands::Status { json } => status::run(&ctx, json),
        Commands::Assign { variant } => assign::run(&ctx, &variant),
        Commands::Reset => reset::run(&ctx),
        Commands::Validate => validate::run(&ctx),
    };

    if let Err(e) = result {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    };
}
