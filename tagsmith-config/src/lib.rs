// A/B test table configuration for Tagsmith

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One A/B test and the right boundaries of its variants.
///
/// The first boundary closes the control variant, every following boundary
/// closes one experiment variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Test name, used as the prefix of every variant label
    pub name: String,

    /// Right boundaries in `(0, 1]`, control first
    pub boundaries: Vec<f64>,
}

impl TestDefinition {
    /// Create a test definition
    pub fn new(name: impl Into<String>, boundaries: impl Into<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            boundaries: boundaries.into(),
        }
    }

    /// Number of experiment variants (all boundaries after the control one)
    pub fn experiment_count(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// The last boundary of this test, if any
    pub fn right_boundary(&self) -> Option<f64> {
        self.boundaries.last().copied()
    }
}

/// The static, ordered list of tests a page is bucketed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbConfig {
    pub tests: Vec<TestDefinition>,
}

impl AbConfig {
    /// Create from an ordered list of tests
    pub fn new(tests: Vec<TestDefinition>) -> Self {
        Self { tests }
    }

    /// Load from a JSON or TOML file, picking the format from the extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ConfigLoader::auto(path)?.load_file(path)
    }

    /// Load from `TAGSMITH_AB_CONFIG` (a `.env` file is honoured), falling
    /// back to the built-in table when the variable is unset.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        match EnvLoader::default().config_path() {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Look up a test by name
    pub fn test(&self, name: &str) -> Option<&TestDefinition> {
        self.tests.iter().find(|t| t.name == name)
    }

    /// Total number of variants, control variants included
    pub fn variant_count(&self) -> usize {
        self.tests.iter().map(|t| t.boundaries.len()).sum()
    }
}

impl Default for AbConfig {
    /// Ten tests covering the whole unit interval.
    ///
    /// Tests 1-5 split 10% into two 5% groups, 6-8 split ~10% three ways,
    /// 9-10 split 10% four ways.
    fn default() -> Self {
        Self::new(vec![
            TestDefinition::new("test1", [0.050, 0.100]),
            TestDefinition::new("test2", [0.150, 0.200]),
            TestDefinition::new("test3", [0.250, 0.300]),
            TestDefinition::new("test4", [0.350, 0.400]),
            TestDefinition::new("test5", [0.450, 0.500]),
            TestDefinition::new("test6", [0.533, 0.566, 0.599]),
            TestDefinition::new("test7", [0.632, 0.665, 0.698]),
            TestDefinition::new("test8", [0.732, 0.766, 0.800]),
            TestDefinition::new("test9", [0.825, 0.850, 0.875, 0.900]),
            TestDefinition::new("test10", [0.925, 0.950, 0.975, 1.000]),
        ])
    }
}
