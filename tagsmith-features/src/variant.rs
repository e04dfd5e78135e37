//! Variant labels and the flattened boundary table.

use serde::Serialize;
use tagsmith_config::AbConfig;

/// Variant literal that enables a feature for every visitor
pub const ALL_VARIANTS: &str = "all";

/// Suffix shared by every control variant label
pub const CONTROL_SUFFIX: &str = "_con";

/// Build the label of a variant: `<test>_con` for index 0, `<test>_exp<N>` otherwise.
pub fn variant_label(test: &str, index: usize) -> String {
    if index == 0 {
        format!("{}{}", test, CONTROL_SUFFIX)
    } else {
        format!("{}_exp{}", test, index)
    }
}

/// Whether a label names a control variant.
pub fn is_control_label(label: &str) -> bool {
    label.ends_with(CONTROL_SUFFIX)
}

/// Test name of a label: everything before its last `_`, empty when there is none.
pub fn test_name_of(label: &str) -> &str {
    label.rsplit_once('_').map_or("", |(test, _)| test)
}

/// One variant of one test, with its effective probability range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantSlot {
    /// Test the variant belongs to
    pub test: String,

    /// 0 for control, N for the N-th experiment
    pub index: usize,

    /// `<test>_con` or `<test>_exp<N>`
    pub label: String,

    /// Previous boundary in the flattened table (inclusive)
    pub left: f64,

    /// This variant's boundary (exclusive)
    pub right: f64,
}

impl VariantSlot {
    pub fn is_control(&self) -> bool {
        self.index == 0
    }

    /// Share of visitors falling into this variant
    pub fn percentage(&self) -> f64 {
        self.right - self.left
    }
}

/// All variants of all tests, flattened in table order.
///
/// Each slot's range starts at whatever boundary precedes it, so a gap
/// between two tests belongs to the following test's control variant.
#[derive(Debug, Clone, Default)]
pub struct BoundaryTable {
    slots: Vec<VariantSlot>,
}

impl BoundaryTable {
    pub fn new(config: &AbConfig) -> Self {
        let mut slots = Vec::with_capacity(config.variant_count());
        let mut left = 0.0;

        for test in &config.tests {
            for (index, &right) in test.boundaries.iter().enumerate() {
                slots.push(VariantSlot {
                    test: test.name.clone(),
                    index,
                    label: variant_label(&test.name, index),
                    left,
                    right,
                });
                left = right;
            }
        }

        Self { slots }
    }

    pub fn slots(&self) -> &[VariantSlot] {
        &self.slots
    }

    /// First slot whose boundary strictly exceeds `factor`.
    pub fn lookup(&self, factor: f64) -> Option<&VariantSlot> {
        self.slots.iter().find(|slot| factor < slot.right)
    }

    /// Slot carrying the given label.
    pub fn slot(&self, label: &str) -> Option<&VariantSlot> {
        self.slots.iter().find(|slot| slot.label == label)
    }

    /// Labels of every experiment (non-control) variant.
    pub fn experiment_labels(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|slot| !slot.is_control())
            .map(|slot| slot.label.as_str())
    }

    /// Slots grouped by test, in table order.
    pub fn tests(&self) -> impl Iterator<Item = &[VariantSlot]> {
        self.slots.chunk_by(|a, b| a.test == b.test && b.index > a.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsmith_config::TestDefinition;

    fn gapped() -> BoundaryTable {
        BoundaryTable::new(&AbConfig::new(vec![
            TestDefinition::new("test1", [0.05, 0.10]),
            TestDefinition::new("test2", [0.15, 0.20]),
        ]))
    }

    #[test]
    fn test_labels() {
        assert_eq!(variant_label("test1", 0), "test1_con");
        assert_eq!(variant_label("test9", 3), "test9_exp3");
        assert!(is_control_label("test1_con"));
        assert!(!is_control_label("test1_exp1"));
        assert!(!is_control_label(ALL_VARIANTS));
    }

    #[test]
    fn test_test_name_of() {
        assert_eq!(test_name_of("test1_exp2"), "test1");
        assert_eq!(test_name_of("my_test_con"), "my_test");
        assert_eq!(test_name_of("nounderscore"), "");
    }

    #[test]
    fn test_flattened_ranges() {
        let table = gapped();
        let ranges: Vec<_> = table
            .slots()
            .iter()
            .map(|s| (s.label.as_str(), s.left, s.right))
            .collect();

        assert_eq!(
            ranges,
            vec![
                ("test1_con", 0.0, 0.05),
                ("test1_exp1", 0.05, 0.10),
                ("test2_con", 0.10, 0.15),
                ("test2_exp1", 0.15, 0.20),
            ]
        );
    }

    #[test]
    fn test_lookup_absorbs_gap_into_following_control() {
        let table = gapped();

        assert_eq!(table.lookup(0.12).unwrap().label, "test2_con");
        assert_eq!(table.lookup(0.10).unwrap().label, "test2_con");
        assert_eq!(table.lookup(0.0).unwrap().label, "test1_con");
        assert!(table.lookup(0.20).is_none());
    }

    #[test]
    fn test_experiment_labels_exclude_controls() {
        let labels: Vec<_> = gapped().experiment_labels().map(String::from).collect();
        assert_eq!(labels, vec!["test1_exp1", "test2_exp1"]);
    }

    #[test]
    fn test_default_table_flattens_every_variant() {
        let table = BoundaryTable::new(&AbConfig::default());

        assert_eq!(table.slots().len(), 27);
        assert_eq!(table.slots().last().unwrap().label, "test10_exp3");
        assert_eq!(table.slots().last().unwrap().right, 1.0);
    }

    #[test]
    fn test_grouping_by_test() {
        let table = BoundaryTable::new(&AbConfig::default());
        let groups: Vec<_> = table.tests().map(|g| (g[0].test.clone(), g.len())).collect();

        assert_eq!(groups.len(), 10);
        assert_eq!(groups[5], ("test6".to_string(), 3));
        assert_eq!(groups[9], ("test10".to_string(), 4));
    }
}
