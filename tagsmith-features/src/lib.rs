//! A/B bucketing and feature gating for Tagsmith
//!
//! Persistent visitor bucketing plus "one feature per variant" exclusivity
//! for independently authored page widgets.
//!
//! # Features
//!
//! - 🎲 **Bucket Assignment** - One persisted random factor per visitor, mapped to a variant
//! - 🚦 **Feature Gate** - At most one feature per experiment variant, never on control
//! - 📈 **Logger Gate** - Replaceable analytics gate with its own claim bookkeeping
//! - 📢 **Ad Targeting** - Variant published as a page-level ad key-value
//! - 🔍 **Debug Validator** - Records every claim and flags invalid or duplicate ones
//!
//! # Quick Start
//!
//! ```
//! use tagsmith_features::*;
//!
//! // One engine per page load
//! let engine = Tagsmith::builder()
//!     .store(Box::new(MemoryStore::with_factor(0.07)))
//!     .build();
//!
//! assert_eq!(engine.user_variant(), Some("test1_exp1"));
//!
//! if engine.enable("quizPopup", "test1_exp1") {
//!     // Show the quiz
//! }
//!
//! // Another widget asking for the same variant is denied
//! assert!(!engine.enable("progressBar", "test1_exp1"));
//! ```
//!
//! # Analytics
//!
//! ```
//! use tagsmith_features::*;
//!
//! let data_layer = DataLayer::new();
//! let engine = Tagsmith::builder()
//!     .store(Box::new(MemoryStore::with_factor(0.07)))
//!     .data_layer(data_layer.clone())
//!     .build();
//!
//! if let Some(logger) = engine.get_logger("quizPopup", "test1_exp1") {
//!     logger.log("answered", Some("42"));
//! }
//!
//! assert_eq!(data_layer.len(), 1);
//! ```
//!
//! # Debugging
//!
//! ```
//! use tagsmith_features::*;
//!
//! let mut engine = Tagsmith::builder()
//!     .store(Box::new(MemoryStore::with_factor(0.07)))
//!     .debug(true)
//!     .build();
//!
//! engine.enable("quizPopup", "test1_con");
//! assert_eq!(engine.debugger().unwrap().errors(), vec!["test1_con is not valid."]);
//!
//! // Takes effect on the next page load
//! engine.activate_variant("test2_exp1").unwrap();
//! let next = Tagsmith::builder().store(engine.into_store()).build();
//! assert_eq!(next.user_variant(), Some("test2_exp1"));
//! ```

pub mod bucket;
pub mod debug;
pub mod engine;
pub mod error;
pub mod gate;
pub mod logger;
pub mod storage;
pub mod targeting;
pub mod variant;

pub use bucket::{Assignment, BucketAssigner, parse_factor};
pub use debug::{
    DebugSnapshot, DebugValidator, ErrorLog, ErrorReporter, TestStatus, VariantStatus,
    format_percentage,
};
pub use engine::{LoggerGateFactory, Tagsmith, TagsmithBuilder};
pub use error::{FeaturesError, FeaturesResult};
pub use gate::{ExclusiveFeatureGate, FeatureGate};
pub use logger::{
    DataLayer, DataLayerLoggerGate, DisabledLoggerGate, EventLogger, EventSink, LoggedEvent,
    LoggerGate,
};
pub use storage::{FACTOR_KEY, FactorStore, FileStore, MemoryStore};
pub use targeting::{
    AdSlotTargeting, AppendOnlyQueue, Command, CommandQueue, PageTargeting, TARGETING_KEY,
    TargetingSink,
};
pub use variant::{ALL_VARIANTS, BoundaryTable, VariantSlot};
