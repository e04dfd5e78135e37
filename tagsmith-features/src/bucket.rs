//! Bucket assignment.
//!
//! A visitor is bucketed by one uniform random factor drawn once and kept in
//! the [`FactorStore`]. The variant is the first slot of the flattened
//! [`BoundaryTable`] whose boundary exceeds that factor.

use crate::storage::{FACTOR_KEY, FactorStore};
use crate::variant::{BoundaryTable, VariantSlot};
use rand::Rng;
use serde::Serialize;
use tagsmith_log::{debug, warn};

/// Outcome of resolving a visitor for one page load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Factor in `[0, 1)` the variant was derived from
    pub factor: f64,

    /// Variant label, `None` when the factor lies past the last boundary
    pub variant: Option<String>,
}

/// Parse a stored factor from its leading decimal number, ignoring any
/// trailing text. No number, or one outside `[0, 1)`, is rejected.
pub fn parse_factor(raw: Option<&str>) -> Option<f64> {
    numeric_prefix(raw?.trim())
        .parse::<f64>()
        .ok()
        .filter(|factor| (0.0..1.0).contains(factor))
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    end += digits(end);
    if bytes.get(end) == Some(&b'.') {
        end += 1 + digits(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let count = digits(exp);
        if count > 0 {
            end = exp + count;
        }
    }

    &s[..end]
}

/// Maps visitors to variants.
#[derive(Debug, Clone)]
pub struct BucketAssigner {
    table: BoundaryTable,
    key: String,
}

impl BucketAssigner {
    pub fn new(table: BoundaryTable) -> Self {
        Self {
            table,
            key: FACTOR_KEY.to_string(),
        }
    }

    /// Use a different storage key for the factor
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn table(&self) -> &BoundaryTable {
        &self.table
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Variant for a factor, without touching storage
    pub fn variant_for(&self, factor: f64) -> Option<&VariantSlot> {
        self.table.lookup(factor)
    }

    /// Read the persisted factor, drawing and persisting a new one when it
    /// is missing or invalid.
    ///
    /// A failed write is logged and the drawn factor is still returned.
    pub fn load_factor<R: Rng + ?Sized>(&self, store: &mut dyn FactorStore, rng: &mut R) -> f64 {
        let stored = store.get(&self.key);

        if let Some(factor) = parse_factor(stored.as_deref()) {
            return factor;
        }

        let factor: f64 = rng.random();
        debug!(
            target: "tagsmith::bucket",
            "stored factor {:?} unusable, drew {}", stored, factor
        );

        if let Err(e) = store.set(&self.key, &factor.to_string()) {
            warn!(target: "tagsmith::bucket", "factor could not be persisted: {}", e);
        }

        factor
    }

    /// Resolve the visitor's variant.
    pub fn resolve<R: Rng + ?Sized>(&self, store: &mut dyn FactorStore, rng: &mut R) -> Assignment {
        let factor = self.load_factor(store, rng);
        let variant = self.variant_for(factor).map(|slot| slot.label.clone());

        debug!(
            target: "tagsmith::bucket",
            "factor {} resolved to {}", factor, variant.as_deref().unwrap_or("no variant")
        );

        Assignment { factor, variant }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FeaturesError, FeaturesResult};
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tagsmith_config::{AbConfig, TestDefinition};

    fn assigner() -> BucketAssigner {
        BucketAssigner::new(BoundaryTable::new(&AbConfig::default()))
    }

    fn label(assigner: &BucketAssigner, factor: f64) -> Option<&str> {
        assigner.variant_for(factor).map(|s| s.label.as_str())
    }

    #[test]
    fn test_parse_factor() {
        assert_eq!(parse_factor(Some("0.07")), Some(0.07));
        assert_eq!(parse_factor(Some(" 0 ")), Some(0.0));
        assert_eq!(parse_factor(None), None);
        assert_eq!(parse_factor(Some("abc")), None);
        assert_eq!(parse_factor(Some("NaN")), None);
        assert_eq!(parse_factor(Some("-0.1")), None);
        assert_eq!(parse_factor(Some("1")), None);
        assert_eq!(parse_factor(Some("inf")), None);
    }

    #[test]
    fn test_parse_factor_ignores_trailing_text() {
        assert_eq!(parse_factor(Some("0.5abc")), Some(0.5));
        assert_eq!(parse_factor(Some("0.3.4")), Some(0.3));
        assert_eq!(parse_factor(Some("5e-1;")), Some(0.5));
        assert_eq!(parse_factor(Some("0.25e")), Some(0.25));
        assert_eq!(parse_factor(Some(".75px")), Some(0.75));
        assert_eq!(parse_factor(Some("7.5e-1x")), Some(0.75));
        assert_eq!(parse_factor(Some("2.5abc")), None);
        assert_eq!(parse_factor(Some(".")), None);
        assert_eq!(parse_factor(Some("x0.5")), None);
    }

    #[test]
    fn test_default_table_mapping() {
        let assigner = assigner();

        assert_eq!(label(&assigner, 0.0), Some("test1_con"));
        assert_eq!(label(&assigner, 0.03), Some("test1_con"));
        assert_eq!(label(&assigner, 0.05), Some("test1_exp1"));
        assert_eq!(label(&assigner, 0.07), Some("test1_exp1"));
        assert_eq!(label(&assigner, 0.51), Some("test6_con"));
        assert_eq!(label(&assigner, 0.88), Some("test9_exp3"));
        assert_eq!(label(&assigner, 0.999_999), Some("test10_exp3"));
    }

    #[test]
    fn test_gap_goes_to_following_control() {
        let assigner = BucketAssigner::new(BoundaryTable::new(&AbConfig::new(vec![
            TestDefinition::new("test1", [0.05, 0.10]),
            TestDefinition::new("test2", [0.15, 0.20]),
        ])));

        assert_eq!(label(&assigner, 0.12), Some("test2_con"));
        assert_eq!(label(&assigner, 0.25), None);
    }

    #[test]
    fn test_resolve_uses_valid_stored_factor() {
        let assigner = assigner();
        let mut store = MemoryStore::with_factor(0.07);
        let mut rng = StdRng::seed_from_u64(1);

        let assignment = assigner.resolve(&mut store, &mut rng);
        assert_eq!(assignment.factor, 0.07);
        assert_eq!(assignment.variant.as_deref(), Some("test1_exp1"));
        assert_eq!(store.get(FACTOR_KEY).as_deref(), Some("0.07"));
    }

    #[test]
    fn test_resolve_regenerates_invalid_factor() {
        let assigner = assigner();

        for raw in ["abc", "NaN", "-0.1", "1", "1.5"] {
            let mut store = MemoryStore::with_factor(raw);
            let mut rng = StdRng::seed_from_u64(7);

            let assignment = assigner.resolve(&mut store, &mut rng);
            assert!((0.0..1.0).contains(&assignment.factor));
            assert_eq!(store.get(FACTOR_KEY), Some(assignment.factor.to_string()));
        }
    }

    #[test]
    fn test_resolve_is_stable_once_persisted() {
        let assigner = assigner();
        let mut store = MemoryStore::new();

        let first = assigner.resolve(&mut store, &mut StdRng::seed_from_u64(3));
        let second = assigner.resolve(&mut store, &mut StdRng::seed_from_u64(99));

        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_key() {
        let assigner = assigner().with_key("other_key");
        let mut store = MemoryStore::with_factor(0.07);

        let assignment = assigner.resolve(&mut store, &mut StdRng::seed_from_u64(5));
        assert_eq!(store.get("other_key"), Some(assignment.factor.to_string()));
        assert_eq!(store.get(FACTOR_KEY).as_deref(), Some("0.07"));
    }

    struct ReadOnlyStore;

    impl FactorStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> FeaturesResult<()> {
            Err(FeaturesError::Storage("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> FeaturesResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_still_assigns() {
        let assignment = assigner().resolve(&mut ReadOnlyStore, &mut StdRng::seed_from_u64(11));

        assert!((0.0..1.0).contains(&assignment.factor));
        assert!(assignment.variant.is_some());
    }
}
