//! Logger gate and event loggers.
//!
//! A [`LoggerGate`] hands out [`EventLogger`]s. The engine ships
//! [`DisabledLoggerGate`]; pages with analytics install a
//! [`DataLayerLoggerGate`] when the engine is built.

use crate::variant::{ALL_VARIANTS, test_name_of};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use tagsmith_log::debug;

/// Event name every Tagsmith analytics event is pushed under
pub const EVENT_NAME: &str = "tagsmith_event";

/// Decides whether a feature may emit analytics events.
///
/// Same call shape as [`FeatureGate`](crate::gate::FeatureGate), separate
/// bookkeeping: a feature denied activation may still get a logger.
pub trait LoggerGate {
    /// A logger, or `None` when the feature must not log.
    fn get_logger(&self, feature: &str, for_variant: &str) -> Option<EventLogger>;
}

/// One analytics event as pushed to the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub event: String,
    #[serde(rename = "userVariant")]
    pub user_variant: Option<String>,
    /// `<feature>.<event name>`
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Destination of logged events.
pub trait EventSink {
    fn record(&self, event: LoggedEvent);
}

/// Logger handed to one feature.
#[derive(Clone)]
pub struct EventLogger {
    feature: String,
    user_variant: Option<String>,
    sink: Rc<dyn EventSink>,
}

impl EventLogger {
    pub fn new(
        feature: impl Into<String>,
        user_variant: Option<String>,
        sink: Rc<dyn EventSink>,
    ) -> Self {
        Self {
            feature: feature.into(),
            user_variant,
            sink,
        }
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Emit `event_name` with an optional value
    pub fn log(&self, event_name: &str, value: Option<&str>) {
        self.sink.record(LoggedEvent {
            event: EVENT_NAME.to_string(),
            user_variant: self.user_variant.clone(),
            id: format!("{}.{}", self.feature, event_name),
            value: value.map(str::to_string),
        });
    }
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("feature", &self.feature)
            .field("user_variant", &self.user_variant)
            .finish_non_exhaustive()
    }
}

/// Gate used when no analytics collaborator is installed: never logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledLoggerGate;

impl LoggerGate for DisabledLoggerGate {
    fn get_logger(&self, _feature: &str, _for_variant: &str) -> Option<EventLogger> {
        None
    }
}

/// Ordered list of analytics events for one page.
///
/// Clones share the same list.
#[derive(Debug, Default, Clone)]
pub struct DataLayer {
    events: Rc<RefCell<Vec<LoggedEvent>>>,
}

impl DataLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// The events as a JSON array
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&*self.events.borrow()).unwrap_or_default()
    }
}

impl EventSink for DataLayer {
    fn record(&self, event: LoggedEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Logger gate pushing events to a [`DataLayer`].
///
/// - `"all"` gets no logger.
/// - Only variants of the visitor's own test get a logger, control included.
/// - Each (feature, test) pair gets one logger per page load.
#[derive(Debug)]
pub struct DataLayerLoggerGate {
    user_variant: Option<String>,
    data_layer: DataLayer,
    issued: RefCell<HashSet<(String, String)>>,
}

impl DataLayerLoggerGate {
    pub fn new(user_variant: Option<String>, data_layer: DataLayer) -> Self {
        Self {
            user_variant,
            data_layer,
            issued: RefCell::new(HashSet::new()),
        }
    }

    pub fn data_layer(&self) -> &DataLayer {
        &self.data_layer
    }
}

impl LoggerGate for DataLayerLoggerGate {
    fn get_logger(&self, feature: &str, for_variant: &str) -> Option<EventLogger> {
        if for_variant == ALL_VARIANTS {
            return None;
        }

        let user_variant = self.user_variant.as_deref()?;
        let test = test_name_of(for_variant);
        if test != test_name_of(user_variant) {
            return None;
        }

        if !self
            .issued
            .borrow_mut()
            .insert((feature.to_string(), test.to_string()))
        {
            debug!(
                target: "tagsmith::logger",
                "{} already holds a logger for {}", feature, test
            );
            return None;
        }

        Some(EventLogger::new(
            feature,
            self.user_variant.clone(),
            Rc::new(self.data_layer.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gate(user_variant: &str) -> DataLayerLoggerGate {
        DataLayerLoggerGate::new(Some(user_variant.to_string()), DataLayer::new())
    }

    #[test]
    fn test_disabled_gate() {
        assert!(DisabledLoggerGate.get_logger("anyFeature", "test1_exp1").is_none());
        assert!(DisabledLoggerGate.get_logger("anyFeature", "all").is_none());
    }

    #[test]
    fn test_no_logger_for_all() {
        assert!(gate("test1_exp1").get_logger("anyFeature", "all").is_none());
    }

    #[test]
    fn test_no_logger_for_other_test() {
        assert!(gate("test1_exp1").get_logger("anyFeature", "test2_exp1").is_none());
    }

    #[test]
    fn test_logger_for_own_test_variants() {
        let gate = gate("test1_exp1");

        assert!(gate.get_logger("anyFeature", "test1_exp1").is_some());
        assert!(gate.get_logger("anotherFeature", "test1_con").is_some());
    }

    #[test]
    fn test_once_per_feature_and_test() {
        let gate = gate("test1_exp1");

        assert!(gate.get_logger("anyFeature", "test1_exp1").is_some());
        assert!(gate.get_logger("anyFeature", "test1_con").is_none());
        assert!(gate.get_logger("anotherFeature", "test1_exp2").is_some());
    }

    #[test]
    fn test_unassigned_visitor_gets_no_logger() {
        let gate = DataLayerLoggerGate::new(None, DataLayer::new());
        assert!(gate.get_logger("anyFeature", "test1_exp1").is_none());
    }

    #[test]
    fn test_logs_into_data_layer() {
        let gate = gate("test1_exp1");
        let logger = gate.get_logger("sampleFeature", "test1_exp1").unwrap();

        logger.log("sampleEvent", Some("sampleValue"));
        logger.log("bare", None);

        assert_eq!(
            gate.data_layer().to_json(),
            json!([
                {
                    "event": "tagsmith_event",
                    "userVariant": "test1_exp1",
                    "id": "sampleFeature.sampleEvent",
                    "value": "sampleValue",
                },
                {
                    "event": "tagsmith_event",
                    "userVariant": "test1_exp1",
                    "id": "sampleFeature.bare",
                },
            ])
        );
    }
}
