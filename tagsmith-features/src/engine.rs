//! The per-page-load engine.
//!
//! A [`Tagsmith`] is built once per page load. Building it resolves the
//! visitor's variant; afterwards widgets only call [`Tagsmith::enable`] and
//! [`Tagsmith::get_logger`].

use crate::bucket::{Assignment, BucketAssigner};
use crate::debug::{DebugSnapshot, DebugValidator, ErrorReporter};
use crate::error::{FeaturesError, FeaturesResult};
use crate::gate::{ExclusiveFeatureGate, FeatureGate};
use crate::logger::{DataLayer, DataLayerLoggerGate, DisabledLoggerGate, EventLogger, LoggerGate};
use crate::storage::{FACTOR_KEY, FactorStore, MemoryStore};
use crate::targeting::{AdSlotTargeting, CommandQueue};
use crate::variant::BoundaryTable;
use rand::RngCore;
use std::fmt;
use tagsmith_config::AbConfig;
use tagsmith_log::info;

/// Builds the logger gate once the visitor's variant is known.
pub type LoggerGateFactory = Box<dyn FnOnce(Option<&str>) -> Box<dyn LoggerGate>>;

enum Gates {
    Production {
        features: ExclusiveFeatureGate,
        loggers: Box<dyn LoggerGate>,
    },
    Debug(DebugValidator),
}

/// Bucket assignment and feature/logger gating for one page load.
pub struct Tagsmith {
    assigner: BucketAssigner,
    store: Box<dyn FactorStore>,
    assignment: Assignment,
    gates: Gates,
    targeting: AdSlotTargeting,
}

impl Tagsmith {
    pub fn builder() -> TagsmithBuilder {
        TagsmithBuilder::new()
    }

    /// Engine over `config` and `store` with production gates
    pub fn new(config: &AbConfig, store: Box<dyn FactorStore>) -> Self {
        TagsmithBuilder::new()
            .config(config.clone())
            .store(store)
            .build()
    }

    /// The visitor's variant, `None` when the factor lies past every boundary
    pub fn user_variant(&self) -> Option<&str> {
        self.assignment.variant.as_deref()
    }

    pub fn factor(&self) -> f64 {
        self.assignment.factor
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn table(&self) -> &BoundaryTable {
        self.assigner.table()
    }

    /// Whether `feature` should activate for the visitor.
    pub fn enable(&self, feature: &str, for_variant: &str) -> bool {
        match &self.gates {
            Gates::Production { features, .. } => features.enable(feature, for_variant),
            Gates::Debug(debugger) => debugger.enable(feature, for_variant),
        }
    }

    /// A logger for `feature`, when the installed logger gate grants one.
    pub fn get_logger(&self, feature: &str, for_variant: &str) -> Option<EventLogger> {
        match &self.gates {
            Gates::Production { loggers, .. } => loggers.get_logger(feature, for_variant),
            Gates::Debug(debugger) => debugger.get_logger(feature, for_variant),
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self.gates, Gates::Debug(_))
    }

    pub fn debugger(&self) -> Option<&DebugValidator> {
        match &self.gates {
            Gates::Debug(debugger) => Some(debugger),
            Gates::Production { .. } => None,
        }
    }

    /// Error reporter for `feature`; only available in debug mode
    pub fn error_reporter(&self, feature: &str) -> Option<ErrorReporter> {
        self.debugger().map(|d| d.error_reporter(feature))
    }

    /// Debug status of this page load; only available in debug mode
    pub fn snapshot(&self) -> Option<DebugSnapshot> {
        self.debugger().map(|d| d.snapshot(self.user_variant()))
    }

    /// Publish the visitor's variant to the ad library command queue.
    pub fn register_targeting(&self, queue: &mut CommandQueue) -> bool {
        self.targeting.schedule(queue, self.user_variant())
    }

    /// Assign the visitor to `label` from the next page load on.
    ///
    /// Only available in debug mode. This engine keeps its current variant.
    pub fn activate_variant(&mut self, label: &str) -> FeaturesResult<f64> {
        let Gates::Debug(debugger) = &self.gates else {
            return Err(FeaturesError::DebugDisabled);
        };

        debugger.activate_variant(label, self.store.as_mut(), self.assigner.key())
    }

    /// Send the debugger's test event; only meaningful in debug mode.
    pub fn send_test_event(&self) -> bool {
        self.debugger()
            .is_some_and(|d| d.send_test_event(self.user_variant()))
    }

    pub fn store(&self) -> &dyn FactorStore {
        self.store.as_ref()
    }

    /// End the page load, handing the store back for the next one
    pub fn into_store(self) -> Box<dyn FactorStore> {
        self.store
    }
}

impl FeatureGate for Tagsmith {
    fn enable(&self, feature: &str, for_variant: &str) -> bool {
        Tagsmith::enable(self, feature, for_variant)
    }
}

impl LoggerGate for Tagsmith {
    fn get_logger(&self, feature: &str, for_variant: &str) -> Option<EventLogger> {
        Tagsmith::get_logger(self, feature, for_variant)
    }
}

impl fmt::Debug for Tagsmith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tagsmith")
            .field("assignment", &self.assignment)
            .field("debug", &self.is_debug())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Tagsmith`].
pub struct TagsmithBuilder {
    config: Option<AbConfig>,
    store: Option<Box<dyn FactorStore>>,
    rng: Option<Box<dyn RngCore>>,
    logger_gate: Option<LoggerGateFactory>,
    debug: bool,
    key: String,
}

impl TagsmithBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            store: None,
            rng: None,
            logger_gate: None,
            debug: false,
            key: FACTOR_KEY.to_string(),
        }
    }

    /// Test table; the built-in table when not set
    pub fn config(mut self, config: AbConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the test table from the environment.
    pub fn from_env(self) -> FeaturesResult<Self> {
        Ok(self.config(AbConfig::from_env()?))
    }

    /// Factor storage; an empty [`MemoryStore`] when not set
    pub fn store(mut self, store: Box<dyn FactorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Random source for drawing new factors; the thread RNG when not set
    pub fn rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Install a logger gate, built from the visitor's variant.
    pub fn logger_gate<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(Option<&str>) -> Box<dyn LoggerGate> + 'static,
    {
        self.logger_gate = Some(Box::new(factory));
        self
    }

    /// Install a [`DataLayerLoggerGate`] pushing into `data_layer`.
    pub fn data_layer(self, data_layer: DataLayer) -> Self {
        self.logger_gate(move |user_variant| {
            Box::new(DataLayerLoggerGate::new(
                user_variant.map(str::to_string),
                data_layer,
            ))
        })
    }

    /// Wrap the gates in a [`DebugValidator`]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Storage key holding the factor
    pub fn factor_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Resolve the visitor and build the engine.
    pub fn build(self) -> Tagsmith {
        let config = self.config.unwrap_or_default();
        let table = BoundaryTable::new(&config);
        let assigner = BucketAssigner::new(table.clone()).with_key(self.key);

        let mut store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let assignment = match self.rng {
            Some(mut rng) => assigner.resolve(store.as_mut(), rng.as_mut()),
            None => assigner.resolve(store.as_mut(), &mut rand::rng()),
        };

        info!(
            target: "tagsmith::engine",
            "visitor assigned to {} (factor {})",
            assignment.variant.as_deref().unwrap_or("no variant"),
            assignment.factor
        );

        let user_variant = assignment.variant.clone();
        let features = ExclusiveFeatureGate::new(user_variant.clone());
        let loggers: Box<dyn LoggerGate> = match self.logger_gate {
            Some(factory) => factory(user_variant.as_deref()),
            None => Box::new(DisabledLoggerGate),
        };

        let gates = if self.debug {
            Gates::Debug(DebugValidator::new(table, Box::new(features), loggers))
        } else {
            Gates::Production { features, loggers }
        };

        Tagsmith {
            assigner,
            store,
            assignment,
            gates,
            targeting: AdSlotTargeting::new(),
        }
    }
}

impl Default for TagsmithBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn engine(factor: f64) -> Tagsmith {
        Tagsmith::builder()
            .store(Box::new(MemoryStore::with_factor(factor)))
            .build()
    }

    fn debug_engine(factor: f64) -> Tagsmith {
        Tagsmith::builder()
            .store(Box::new(MemoryStore::with_factor(factor)))
            .debug(true)
            .build()
    }

    #[test]
    fn test_resolves_from_store() {
        let engine = engine(0.07);

        assert_eq!(engine.user_variant(), Some("test1_exp1"));
        assert_eq!(engine.factor(), 0.07);
        assert!(!engine.is_debug());
    }

    #[test]
    fn test_draws_factor_with_given_rng() {
        let engine = Tagsmith::builder()
            .rng(Box::new(StdRng::seed_from_u64(42)))
            .build();

        let stored = engine.store().get(FACTOR_KEY).unwrap();
        assert_eq!(stored, engine.factor().to_string());
        assert!(engine.user_variant().is_some());
    }

    #[test]
    fn test_production_gates() {
        let engine = engine(0.07);

        assert!(engine.enable("featureA", "all"));
        assert!(engine.enable("featureA", "test1_exp1"));
        assert!(!engine.enable("featureB", "test1_exp1"));
        assert!(!engine.enable("featureC", "test1_con"));
        assert!(engine.get_logger("featureA", "test1_exp1").is_none());
        assert!(engine.debugger().is_none());
        assert!(engine.error_reporter("featureA").is_none());
        assert!(engine.snapshot().is_none());
    }

    #[test]
    fn test_logger_claims_independent_of_enable() {
        let data_layer = DataLayer::new();
        let engine = Tagsmith::builder()
            .store(Box::new(MemoryStore::with_factor(0.07)))
            .data_layer(data_layer.clone())
            .build();

        assert!(engine.enable("featureA", "test1_exp1"));
        assert!(!engine.enable("featureB", "test1_exp1"));

        let logger = engine.get_logger("featureB", "test1_exp1").unwrap();
        logger.log("shown", None);

        assert_eq!(data_layer.events()[0].id, "featureB.shown");
    }

    #[test]
    fn test_debug_wraps_gates() {
        let engine = debug_engine(0.03);

        assert!(!engine.enable("featureA", "test1_con"));
        assert_eq!(
            engine.debugger().unwrap().errors(),
            vec!["test1_con is not valid."]
        );
        assert!(engine.error_reporter("featureA").is_some());
        assert_eq!(
            engine.snapshot().unwrap().user_variant.as_deref(),
            Some("test1_con")
        );
    }

    #[test]
    fn test_activate_requires_debug() {
        let mut engine = engine(0.07);

        let err = engine.activate_variant("test2_exp1").unwrap_err();
        assert!(matches!(err, FeaturesError::DebugDisabled));
    }

    #[test]
    fn test_activate_applies_on_next_page_load() {
        let mut engine = debug_engine(0.07);

        engine.activate_variant("test2_exp1").unwrap();
        assert_eq!(engine.user_variant(), Some("test1_exp1"));

        let reloaded = Tagsmith::builder().store(engine.into_store()).build();
        assert_eq!(reloaded.user_variant(), Some("test2_exp1"));
    }

    #[test]
    fn test_custom_factor_key() {
        let mut engine = Tagsmith::builder()
            .store(Box::new(MemoryStore::new()))
            .factor_key("custom")
            .debug(true)
            .rng(Box::new(StdRng::seed_from_u64(1)))
            .build();

        engine.activate_variant("test3_exp1").unwrap();
        assert_eq!(engine.store().get("custom").as_deref(), Some("0.25"));
        assert_eq!(engine.store().get(FACTOR_KEY), None);
    }

    #[test]
    fn test_targeting_once() {
        let engine = engine(0.07);
        let mut queue = CommandQueue::pending();

        assert!(engine.register_targeting(&mut queue));
        assert!(!engine.register_targeting(&mut queue));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_engine_as_gate_objects() {
        let engine = engine(0.07);
        let gate: &dyn FeatureGate = &engine;

        assert!(gate.enable("featureA", "test1_exp1"));
        assert!(!engine.enable("featureB", "test1_exp1"));
    }
}
