//! Debug validator.
//!
//! [`DebugValidator`] decorates a feature gate and a logger gate. Every call
//! is recorded and checked against the test table, then delegated unchanged,
//! so widgets behave exactly as in production while problems pile up in an
//! error log for the debug UI.

use crate::error::{FeaturesError, FeaturesResult};
use crate::gate::FeatureGate;
use crate::logger::{EventLogger, LoggerGate};
use crate::storage::FactorStore;
use crate::variant::{ALL_VARIANTS, BoundaryTable, test_name_of};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use tagsmith_log::{debug, info};

/// Feature id the test-setup helper requests its logger under
pub const DEBUGGER_FEATURE: &str = "debugger";

/// Event name sent by the test-setup helper
pub const TEST_EVENT_NAME: &str = "testEventName";

/// Event value sent by the test-setup helper
pub const TEST_EVENT_VALUE: &str = "testEventValue";

/// Append-only list of error messages, shared with every [`ErrorReporter`].
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    messages: Rc<RefCell<Vec<String>>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(target: "tagsmith::debug", "{}", message);
        self.messages.borrow_mut().push(message);
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

/// Lets a feature add its own messages to the debug error log.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    feature: String,
    log: ErrorLog,
}

impl ErrorReporter {
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Record `"<feature>": <message>`
    pub fn report(&self, message: impl fmt::Display) {
        self.log.push(format!("\"{}\": {}", self.feature, message));
    }
}

/// Recording decorator around the production gates.
pub struct DebugValidator {
    features: Box<dyn FeatureGate>,
    loggers: Box<dyn LoggerGate>,
    table: BoundaryTable,
    valid_variants: HashSet<String>,
    errors: ErrorLog,
    features_for_all: RefCell<Vec<String>>,
    feature_by_variant: RefCell<HashMap<String, String>>,
    loggers_by_test: RefCell<HashMap<String, Vec<String>>>,
    test_logger: RefCell<Option<EventLogger>>,
}

impl DebugValidator {
    pub fn new(
        table: BoundaryTable,
        features: Box<dyn FeatureGate>,
        loggers: Box<dyn LoggerGate>,
    ) -> Self {
        let valid_variants = table.experiment_labels().map(str::to_string).collect();

        Self {
            features,
            loggers,
            table,
            valid_variants,
            errors: ErrorLog::new(),
            features_for_all: RefCell::new(Vec::new()),
            feature_by_variant: RefCell::new(HashMap::new()),
            loggers_by_test: RefCell::new(HashMap::new()),
            test_logger: RefCell::new(None),
        }
    }

    pub fn table(&self) -> &BoundaryTable {
        &self.table
    }

    /// Recorded errors, oldest first
    pub fn errors(&self) -> Vec<String> {
        self.errors.messages()
    }

    /// Features that asked for `"all"`, in call order
    pub fn features_for_all(&self) -> Vec<String> {
        self.features_for_all.borrow().clone()
    }

    /// Feature recorded as owner of a variant
    pub fn feature_for(&self, variant: &str) -> Option<String> {
        self.feature_by_variant.borrow().get(variant).cloned()
    }

    /// Features that asked for a logger under a test, in call order
    pub fn loggers_for(&self, test: &str) -> Vec<String> {
        self.loggers_by_test
            .borrow()
            .get(test)
            .cloned()
            .unwrap_or_default()
    }

    pub fn error_reporter(&self, feature: &str) -> ErrorReporter {
        ErrorReporter {
            feature: feature.to_string(),
            log: self.errors.clone(),
        }
    }

    /// Status of every test and variant for the given visitor.
    pub fn snapshot(&self, user_variant: Option<&str>) -> DebugSnapshot {
        let feature_by_variant = self.feature_by_variant.borrow();
        let loggers_by_test = self.loggers_by_test.borrow();

        let tests = self
            .table
            .tests()
            .map(|slots| {
                let name = slots[0].test.clone();
                let variants: Vec<_> = slots
                    .iter()
                    .map(|slot| VariantStatus {
                        name: slot.label.clone(),
                        percentage: slot.percentage(),
                        left_boundary: slot.left,
                        active: user_variant == Some(slot.label.as_str()),
                        feature: feature_by_variant.get(&slot.label).cloned(),
                    })
                    .collect();

                TestStatus {
                    percentage: variants.iter().map(|v| v.percentage).sum(),
                    loggers: loggers_by_test.get(&name).cloned().unwrap_or_default(),
                    name,
                    variants,
                }
            })
            .collect();

        DebugSnapshot {
            user_variant: user_variant.map(str::to_string),
            errors: self.errors(),
            features_for_all: self.features_for_all(),
            tests,
        }
    }

    /// Move the visitor into `label` by overwriting the factor stored under
    /// `key` with the start of the variant's range.
    ///
    /// The current page load keeps its assignment; the next engine built over
    /// `store` resolves to `label`. Returns the written factor.
    pub fn activate_variant(
        &self,
        label: &str,
        store: &mut dyn FactorStore,
        key: &str,
    ) -> FeaturesResult<f64> {
        let slot = self
            .table
            .slot(label)
            .ok_or_else(|| FeaturesError::UnknownVariant(label.to_string()))?;

        store.set(key, &slot.left.to_string())?;
        info!(
            target: "tagsmith::debug",
            "visitor assigned to {} (factor {}), reload to apply", label, slot.left
        );

        Ok(slot.left)
    }

    /// Send the test event through a `debugger` logger for the visitor's variant.
    ///
    /// The logger is requested through this validator, so the request is
    /// recorded like any other. Returns `false` when no logger is available.
    pub fn send_test_event(&self, user_variant: Option<&str>) -> bool {
        let Some(variant) = user_variant else {
            return false;
        };

        let mut cached = self.test_logger.borrow_mut();
        if cached.is_none() {
            *cached = self.get_logger(DEBUGGER_FEATURE, variant);
        }

        match cached.as_ref() {
            Some(logger) => {
                logger.log(TEST_EVENT_NAME, Some(TEST_EVENT_VALUE));
                true
            }
            None => false,
        }
    }
}

impl FeatureGate for DebugValidator {
    fn enable(&self, feature: &str, for_variant: &str) -> bool {
        if for_variant == ALL_VARIANTS {
            self.features_for_all.borrow_mut().push(feature.to_string());
        } else if !self.valid_variants.contains(for_variant) {
            self.errors.push(format!("{} is not valid.", for_variant));
        } else {
            let mut owners = self.feature_by_variant.borrow_mut();
            match owners.get(for_variant) {
                Some(owner) => self
                    .errors
                    .push(format!("{} already used by {}", for_variant, owner)),
                None => {
                    owners.insert(for_variant.to_string(), feature.to_string());
                }
            }
        }

        self.features.enable(feature, for_variant)
    }
}

impl LoggerGate for DebugValidator {
    fn get_logger(&self, feature: &str, for_variant: &str) -> Option<EventLogger> {
        if for_variant != ALL_VARIANTS {
            let mut by_test = self.loggers_by_test.borrow_mut();
            let loggers = by_test.entry(test_name_of(for_variant).to_string()).or_default();
            if !loggers.iter().any(|f| f == feature) {
                loggers.push(feature.to_string());
            }
        }

        self.loggers.get_logger(feature, for_variant)
    }
}

impl fmt::Debug for DebugValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugValidator")
            .field("valid_variants", &self.valid_variants.len())
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

/// Format a share as a percentage with two decimals, e.g. `0.05` as `5.00%`.
pub fn format_percentage(share: f64) -> String {
    format!("{:.2}%", share * 100.0)
}

/// Debug UI view of one page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugSnapshot {
    pub user_variant: Option<String>,
    pub errors: Vec<String>,
    pub features_for_all: Vec<String>,
    pub tests: Vec<TestStatus>,
}

/// One test in a [`DebugSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStatus {
    pub name: String,
    pub percentage: f64,
    pub variants: Vec<VariantStatus>,
    /// Features that requested a logger under this test
    pub loggers: Vec<String>,
}

/// One variant in a [`TestStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStatus {
    pub name: String,
    pub percentage: f64,
    pub left_boundary: f64,
    /// The visitor is in this variant
    pub active: bool,
    /// Feature that claimed this variant
    pub feature: Option<String>,
}

impl DebugSnapshot {
    pub fn to_json(&self) -> FeaturesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn test(&self, name: &str) -> Option<&TestStatus> {
        self.tests.iter().find(|t| t.name == name)
    }

    pub fn variant(&self, name: &str) -> Option<&VariantStatus> {
        self.tests
            .iter()
            .flat_map(|t| t.variants.iter())
            .find(|v| v.name == name)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    if items.is_empty() {
        return writeln!(f, "  None");
    }
    for item in items {
        writeln!(f, "  {}", item)?;
    }
    Ok(())
}

impl fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "User variant: {}",
            self.user_variant.as_deref().unwrap_or("None")
        )?;
        write_list(f, "Errors", &self.errors)?;
        write_list(f, "Features for all", &self.features_for_all)?;
        writeln!(f, "Tests:")?;

        for test in &self.tests {
            writeln!(f, "  {} ({})", test.name, format_percentage(test.percentage))?;

            for variant in &test.variants {
                let marker = if variant.active { '*' } else { ' ' };
                write!(
                    f,
                    "   {} {:<14} {:>7}",
                    marker,
                    variant.name,
                    format_percentage(variant.percentage)
                )?;
                match &variant.feature {
                    Some(feature) => writeln!(f, "  {}", feature)?,
                    None => writeln!(f)?,
                }
            }

            if !test.loggers.is_empty() {
                writeln!(f, "    loggers: {}", test.loggers.join(", "))?;
            }
        }

        Ok(())
    }
}
