//! CLI command implementations.

pub mod assign;
pub mod reset;
pub mod resolve;
pub mod status;
pub mod validate;

use crate::error::CliResult;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tagsmith_config::AbConfig;
use tagsmith_features::{FileStore, Tagsmith};

/// Paths shared by every command.
pub struct Context {
    config_path: Option<PathBuf>,
    state_path: PathBuf,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, state_path: PathBuf) -> Self {
        Self {
            config_path,
            state_path,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// The test table from `--config`, else from the environment.
    pub fn load_config(&self) -> CliResult<AbConfig> {
        let config = match &self.config_path {
            Some(path) => AbConfig::from_file(path)?,
            None => AbConfig::from_env()?,
        };
        Ok(config)
    }

    pub fn open_store(&self) -> CliResult<FileStore> {
        Ok(FileStore::open(&self.state_path)?)
    }

    /// One page load over the state file.
    pub fn page_load(&self, debug: bool) -> CliResult<Tagsmith> {
        Ok(Tagsmith::builder()
            .config(self.load_config()?)
            .store(Box::new(self.open_store()?))
            .debug(debug)
            .build())
    }
}

pub(crate) fn success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub(crate) fn warn(msg: &str) {
    println!("  {} {}", "⚠".yellow().bold(), msg.yellow());
}

pub(crate) fn info(msg: &str) {
    println!("  {} {}", "→".cyan(), msg);
}
