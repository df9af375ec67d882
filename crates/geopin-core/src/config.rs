//! Annotation defaults and storage location.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Title given to a marker when it is first placed.
pub const DEFAULT_MARKER_TITLE: &str = "New Location";

/// Image shown for a marker when it is first placed.
pub const DEFAULT_MARKER_IMAGE: &str = "https://via.placeholder.com/150";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for the annotation core.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Title for newly placed markers.
    pub default_title: String,
    /// Image URL for newly placed markers.
    pub default_image: String,
    /// Directory for stored annotations; the platform data dir when unset.
    pub storage_dir: Option<PathBuf>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_MARKER_TITLE.to_string(),
            default_image: DEFAULT_MARKER_IMAGE.to_string(),
            storage_dir: None,
        }
    }
}

impl AnnotationConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Open file storage at the configured directory or the default location.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_storage(&self) -> crate::storage::StorageResult<crate::storage::FileStorage> {
        match &self.storage_dir {
            Some(dir) => crate::storage::FileStorage::new(dir.clone()),
            None => crate::storage::FileStorage::default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AnnotationConfig::default();
        assert_eq!(config.default_title, "New Location");
        assert_eq!(config.default_image, "https://via.placeholder.com/150");
        assert!(config.storage_dir.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = AnnotationConfig::from_json(r#"{"default_title":"Pin"}"#).unwrap();
        assert_eq!(config.default_title, "Pin");
        assert_eq!(config.default_image, DEFAULT_MARKER_IMAGE);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AnnotationConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = AnnotationConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_and_open_storage() {
        let dir = tempdir().unwrap();
        let config = AnnotationConfig {
            storage_dir: Some(dir.path().join("data")),
            ..Default::default()
        };
        let path = dir.path().join("geopin.json");
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        let loaded = AnnotationConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let storage = loaded.open_storage().unwrap();
        assert_eq!(storage.base_path(), dir.path().join("data").as_path());
    }
}
