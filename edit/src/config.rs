//! History settings read from the editor configuration file.
//!
//! ```toml
//! [history]
//! max_undo = 250
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::history::DEFAULT_MAX_UNDO;

/// Errors produced while loading a [`HistoryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse editor config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid history config: {0}")]
    Invalid(String),
}

/// Undo/redo settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept per document.
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EditorConfigFile {
    #[serde(default)]
    history: HistoryConfig,
}

impl HistoryConfig {
    /// Reads the `[history]` table of an editor config. Missing tables and
    /// keys fall back to defaults; other tables are ignored.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: EditorConfigFile = toml::from_str(content)?;
        if file.history.max_undo == 0 {
            return Err(ConfigError::Invalid("max_undo must be at least 1".into()));
        }
        Ok(file.history)
    }

    /// Loads the `[history]` table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!(
            "Loaded history config from {}: max_undo = {}",
            path.display(),
            config.max_undo
        );
        Ok(config)
    }
}
