//! Scene configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name, used in logs and snapshots
    pub name: String,
    /// Longest parent chain (root included) that `set_parent` accepts
    pub max_hierarchy_depth: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: String::from("Untitled"),
            max_hierarchy_depth: 256,
        }
    }
}

impl SceneConfig {
    /// Create a new config with a name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the maximum hierarchy depth
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }

    /// Parse a config from RON text. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }
}

/// Errors that can occur while loading a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Parse error
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SceneConfig::default()
            .with_name("Level 1")
            .with_max_hierarchy_depth(8);
        assert_eq!(config.name, "Level 1");
        assert_eq!(config.max_hierarchy_depth, 8);
    }

    #[test]
    fn test_config_from_ron_partial() {
        let config = SceneConfig::from_ron_str("(name: \"Arena\")").unwrap();
        assert_eq!(config.name, "Arena");
        assert_eq!(config.max_hierarchy_depth, 256);
    }

    #[test]
    fn test_config_from_ron_invalid() {
        let err = SceneConfig::from_ron_str("(max_hierarchy_depth: \"deep\")").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = SceneConfig::load_ron("/nonexistent/scene_config.ron").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
