use serde::Deserialize;

use crate::error::StoreError;

/// Client settings for the SSM-backed store. Parsed from TOML.
///
/// Every field is optional; unset fields fall back to the ambient AWS
/// environment (env vars, shared config and credentials files).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// AWS region, e.g. `eu-west-1`.
    pub region: Option<String>,

    /// Named profile from the shared config files.
    pub profile: Option<String>,

    /// Endpoint override, e.g. a local emulator.
    pub endpoint_url: Option<String>,
}

impl StoreConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, StoreError> {
        toml::from_str(toml_str).map_err(|e| StoreError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(StoreConfig::parse("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = StoreConfig::parse(
            r#"
            region = "eu-west-1"
            profile = "staging"
            endpoint_url = "http://localhost:4566"
            "#,
        )
        .unwrap();
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.profile.as_deref(), Some("staging"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn unknown_field_is_config_error() {
        let err = StoreConfig::parse("regoin = \"eu-west-1\"").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)), "{err}");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "region = \"us-east-2\"").unwrap();
        let config = StoreConfig::load(file.path()).unwrap();
        assert_eq!(config.region.as_deref(), Some("us-east-2"));
    }

    #[test]
    fn load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = StoreConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"), "{err}");
    }
}
