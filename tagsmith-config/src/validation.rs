// Test table validation
//
// The engine never validates its table at runtime; these checks are run by
// tooling (the CLI `validate` command, CI) before a table ships.

use crate::{AbConfig, ConfigError, Result, TestDefinition};
use std::collections::HashSet;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Test table validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a boundary lies in `(0, 1]`
    pub fn is_boundary(value: f64, field: &str) -> Result<()> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "{} must be in (0, 1], got {}",
                field, value
            )));
        }
        Ok(())
    }

    /// Validate that a test has a control and at least one experiment variant
    pub fn has_experiment(test: &TestDefinition) -> Result<()> {
        if test.experiment_count() == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} needs a control boundary and at least one experiment boundary",
                test.name
            )));
        }
        Ok(())
    }

    /// Collect every problem in a test table, in table order
    pub fn problems(config: &AbConfig) -> Vec<String> {
        let mut problems = Vec::new();
        let mut names = HashSet::new();
        let mut previous: Option<(f64, String)> = None;

        let mut check = |result: Result<()>| {
            if let Err(ConfigError::ValidationError(msg)) = result {
                problems.push(msg);
            }
        };

        for test in &config.tests {
            check(Self::not_empty(&test.name, "test name"));
            check(Self::has_experiment(test));

            if !test.name.is_empty() && !names.insert(test.name.as_str()) {
                check(Err(ConfigError::ValidationError(format!(
                    "{} is defined more than once",
                    test.name
                ))));
            }

            for (index, &boundary) in test.boundaries.iter().enumerate() {
                let field = format!("{}[{}]", test.name, index);
                check(Self::is_boundary(boundary, &field));

                if let Some((last, ref last_field)) = previous
                    && boundary < last
                {
                    check(Err(ConfigError::ValidationError(format!(
                        "{} ({}) is lower than {} ({})",
                        field, boundary, last_field, last
                    ))));
                }
                previous = Some((boundary, field));
            }
        }

        problems
    }
}

impl Validate for AbConfig {
    fn validate(&self) -> Result<()> {
        let problems = ConfigValidator::problems(self);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(problems.join("; ")))
        }
    }
}
