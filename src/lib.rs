// Tagsmith - persistent A/B bucketing for on-page widgets
//
// This library assigns each visitor to one variant of a static test table and
// arbitrates which independently authored widgets may activate and log for
// that variant.

// Re-export the engine
pub use tagsmith_features::*;

// Re-export the test table
pub use tagsmith_config::{AbConfig, ConfigError, ConfigValidator, TestDefinition, Validate};

// Re-export member crates
pub use tagsmith_config;
pub use tagsmith_features;

#[cfg(feature = "log")]
pub use tagsmith_log;

/// Prelude module for convenient imports.
///
/// ```
/// use tagsmith::prelude::*;
///
/// let engine = Tagsmith::builder()
///     .store(Box::new(MemoryStore::with_factor(0.51)))
///     .build();
///
/// assert_eq!(engine.user_variant(), Some("test6_con"));
/// assert!(!engine.enable("progressBar", "test6_con"));
/// ```
pub mod prelude {
    pub use crate::{
        AbConfig, CommandQueue, DataLayer, EventLogger, FactorStore, FeatureGate, FeaturesError,
        FileStore, LoggerGate, MemoryStore, Tagsmith, TagsmithBuilder, TestDefinition,
    };
}
