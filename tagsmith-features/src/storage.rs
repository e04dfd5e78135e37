//! Durable visitor storage.
//!
//! The engine persists exactly one value, the visitor's random factor, as a
//! decimal string under [`FACTOR_KEY`]. Other keys belong to widgets.

use crate::error::{FeaturesError, FeaturesResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Key holding the visitor's random factor
pub const FACTOR_KEY: &str = "__tagsmith_ab_factor";

/// Visitor-scoped string storage, the equivalent of a browser's local storage.
pub trait FactorStore {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&mut self, key: &str, value: &str) -> FeaturesResult<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&mut self, key: &str) -> FeaturesResult<()>;
}

/// In-memory store, lives as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a factor
    pub fn with_factor(factor: impl ToString) -> Self {
        let mut store = Self::new();
        store.entries.insert(FACTOR_KEY.to_string(), factor.to_string());
        store
    }
}

impl FactorStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> FeaturesResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> FeaturesResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object on disk.
///
/// Every write rewrites the whole file through a sibling `.tmp` file and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> FeaturesResult<Self> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(FeaturesError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> FeaturesResult<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");

        fs::write(&tmp, json)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                FeaturesError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
            })
    }
}

impl FactorStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> FeaturesResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> FeaturesResult<()> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
