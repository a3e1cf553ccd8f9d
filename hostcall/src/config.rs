//! Bridge configuration, read from TOML
//!
//! ```toml
//! default_package = "CL-USER"
//! foreign_package = "FOREIGN"
//! export_foreign = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Package receiving registrations that name no package
    pub default_package: String,
    /// Package the foreign operations are installed in
    pub foreign_package: String,
    /// Export the foreign operation symbols from their package
    pub export_foreign: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            default_package: "CL-USER".to_string(),
            foreign_package: "FOREIGN".to_string(),
            export_foreign: true,
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(BridgeConfig::from_toml_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = BridgeConfig::from_toml_str("foreign_package = \"JAVA\"\n").unwrap();
        assert_eq!(config.foreign_package, "JAVA");
        assert_eq!(config.default_package, "CL-USER");
        assert!(config.export_foreign);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BridgeConfig::from_toml_str("packages = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(BridgeConfig::from_toml_str("export_foreign = \"yes\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = BridgeConfig::load(Path::new("/nonexistent/hostcall.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config /nonexistent/hostcall.toml"));
    }
}
