//! Feature activation gate.

use crate::variant::{ALL_VARIANTS, is_control_label};
use std::cell::RefCell;
use std::collections::HashMap;
use tagsmith_log::debug;

/// Decides whether a feature may activate for the current visitor.
///
/// Implementations keep per-page-load state and are called through shared
/// references, in the order the host page runs its tags.
pub trait FeatureGate {
    /// `true` when `feature` should be active for the current visitor.
    fn enable(&self, feature: &str, for_variant: &str) -> bool;
}

/// The production gate: at most one feature per experiment variant.
///
/// - `"all"` always enables and claims nothing.
/// - Control variants never enable.
/// - Otherwise the first feature to ask for a variant claims it, whether or
///   not the current visitor is in that variant; later features are denied.
#[derive(Debug, Default)]
pub struct ExclusiveFeatureGate {
    user_variant: Option<String>,
    claims: RefCell<HashMap<String, String>>,
}

impl ExclusiveFeatureGate {
    pub fn new(user_variant: Option<String>) -> Self {
        Self {
            user_variant,
            claims: RefCell::new(HashMap::new()),
        }
    }

    /// Feature owning a variant in this page load
    pub fn owner(&self, variant: &str) -> Option<String> {
        self.claims.borrow().get(variant).cloned()
    }

    /// Number of claimed variants
    pub fn claim_count(&self) -> usize {
        self.claims.borrow().len()
    }
}

impl FeatureGate for ExclusiveFeatureGate {
    fn enable(&self, feature: &str, for_variant: &str) -> bool {
        if for_variant == ALL_VARIANTS {
            return true;
        }

        if is_control_label(for_variant) {
            return false;
        }

        let mut claims = self.claims.borrow_mut();
        if let Some(owner) = claims.get(for_variant) {
            debug!(
                target: "tagsmith::gate",
                "{} denied {}: claimed by {}", feature, for_variant, owner
            );
            return false;
        }
        claims.insert(for_variant.to_string(), feature.to_string());

        self.user_variant.as_deref() == Some(for_variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(user_variant: &str) -> ExclusiveFeatureGate {
        ExclusiveFeatureGate::new(Some(user_variant.to_string()))
    }

    #[test]
    fn test_all_always_enables() {
        let gate = gate("test1_exp1");

        assert!(gate.enable("featureA", "all"));
        assert!(gate.enable("featureB", "all"));
        assert!(ExclusiveFeatureGate::new(None).enable("featureA", "all"));
        assert_eq!(gate.claim_count(), 0);
    }

    #[test]
    fn test_control_never_enables() {
        let gate = gate("test1_con");

        assert!(!gate.enable("featureA", "test1_con"));
        assert_eq!(gate.owner("test1_con"), None);
    }

    #[test]
    fn test_matching_variant_enables() {
        assert!(gate("test1_exp1").enable("featureA", "test1_exp1"));
    }

    #[test]
    fn test_other_variant_claims_without_enabling() {
        let gate = gate("test1_exp1");

        assert!(!gate.enable("featureA", "test2_exp1"));
        assert_eq!(gate.owner("test2_exp1").as_deref(), Some("featureA"));
    }

    #[test]
    fn test_first_claim_wins() {
        let gate = gate("test1_exp1");

        assert!(gate.enable("featureA", "test1_exp1"));
        assert!(!gate.enable("featureB", "test1_exp1"));
        assert!(!gate.enable("featureA", "test1_exp1"));
        assert_eq!(gate.owner("test1_exp1").as_deref(), Some("featureA"));
    }

    #[test]
    fn test_claim_recorded_for_non_matching_visitor() {
        let gate = gate("test2_exp1");

        assert!(!gate.enable("featureA", "test1_exp1"));
        assert!(!gate.enable("featureB", "test1_exp1"));
        assert_eq!(gate.owner("test1_exp1").as_deref(), Some("featureA"));
    }

    #[test]
    fn test_call_order_decides_owner() {
        let ab = gate("test1_exp1");
        assert!(ab.enable("featureA", "test1_exp1"));
        assert!(!ab.enable("featureB", "test1_exp1"));

        let ba = gate("test1_exp1");
        assert!(ba.enable("featureB", "test1_exp1"));
        assert!(!ba.enable("featureA", "test1_exp1"));
    }

    #[test]
    fn test_unassigned_visitor_never_matches() {
        let gate = ExclusiveFeatureGate::new(None);

        assert!(!gate.enable("featureA", "test1_exp1"));
        assert_eq!(gate.claim_count(), 1);
    }
}
