// TAGSMITH_* environment lookups

use crate::{ConfigError, Result};
use std::env;
use std::path::PathBuf;

/// Prefix shared by every Tagsmith variable
pub const ENV_PREFIX: &str = "TAGSMITH";

/// Key (after the prefix) naming the test table file
pub const CONFIG_PATH_VAR: &str = "AB_CONFIG";

/// Reads prefixed environment variables
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Full variable name for `key`, e.g. `ab_config` as `TAGSMITH_AB_CONFIG`
    pub fn var_name(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    pub fn load_var(&self, key: &str) -> Result<String> {
        let name = self.var_name(key);
        env::var(&name).map_err(|source| ConfigError::EnvError { name, source })
    }

    /// A path variable; unset and blank values both count as absent
    pub fn path_var(&self, key: &str) -> Option<PathBuf> {
        self.load_var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// Path of the test table file, when one is configured
    pub fn config_path(&self) -> Option<PathBuf> {
        self.path_var(CONFIG_PATH_VAR)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_name() {
        assert_eq!(EnvLoader::default().var_name("ab_config"), "TAGSMITH_AB_CONFIG");
        assert_eq!(EnvLoader::new(None).var_name("state"), "STATE");
    }

    #[test]
    fn test_missing_var_names_the_variable() {
        let loader = EnvLoader::new(Some("TAGSMITH_TEST".to_string()));
        let err = loader.load_var("missing_var_67890").unwrap_err();

        assert!(err.to_string().contains("TAGSMITH_TEST_MISSING_VAR_67890"));
    }

    #[test]
    fn test_missing_path_var_is_absent() {
        let loader = EnvLoader::new(Some("TAGSMITH_TEST".to_string()));
        assert_eq!(loader.path_var("NO_SUCH_PATH_24680"), None);
    }
}
