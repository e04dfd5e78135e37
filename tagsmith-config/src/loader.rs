// Test table file loaders

use crate::{AbConfig, ConfigError, Result};
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Test table loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat("no file extension".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        Ok(Self::new(format))
    }

    /// Load a test table from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<AbConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse a test table from string
    pub fn parse(&self, content: &str) -> Result<AbConfig> {
        match self.format {
            FileFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("JSON: {}", e))),
            FileFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::ParseError(format!("TOML: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let json = r#"{"tests": [{"name": "hero", "boundaries": [0.1, 0.2, 0.3]}]}"#;

        let config = loader.parse(json).unwrap();
        assert_eq!(config.tests[0].name, "hero");
        assert_eq!(config.tests[0].boundaries, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            [[tests]]
            name = "hero"
            boundaries = [0.1, 0.2]

            [[tests]]
            name = "footer"
            boundaries = [0.3, 0.4, 0.5]
        "#;

        let config = loader.parse(toml).unwrap();
        assert_eq!(config.tests.len(), 2);
        assert_eq!(config.tests[1].experiment_count(), 2);
    }

    #[test]
    fn test_parse_error() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let err = loader.parse(r#"{"tests": [{"name": "hero"}]}"#).unwrap_err();

        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_auto_without_extension() {
        assert!(ConfigLoader::auto("tests").is_err());
        assert!(ConfigLoader::auto("tests.ini").is_err());
    }
}
