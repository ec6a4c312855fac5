//! Composer configuration
//!
//! Suggestion caps and sampling behaviour, read from
//! `<config dir>/deskchat/compose.json`. Every field is optional; a missing
//! file means defaults.

use crate::error::{ComposeError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How `@` suggestions are picked before anything is typed after the trigger.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyQuerySampling {
    /// Shuffle and take the first entries (order differs per call)
    Random,
    /// Take the first entries in directory order
    FirstN,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ComposeConfig {
    /// Cap on `@` suggestions once a query has been typed
    pub max_mention_suggestions: usize,
    /// Departments shown for a bare `@`
    pub sample_departments: usize,
    /// Users shown for a bare `@`
    pub sample_users: usize,
    /// Cap on `#` suggestions
    pub max_ticket_suggestions: usize,
    pub empty_query_sampling: EmptyQuerySampling,
    /// Message preview length used in mention notifications
    pub preview_chars: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            max_mention_suggestions: 3,
            sample_departments: 1,
            sample_users: 2,
            max_ticket_suggestions: 8,
            empty_query_sampling: EmptyQuerySampling::Random,
            preview_chars: 100,
        }
    }
}

impl ComposeConfig {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("no config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }

        let data = fs::read(path).map_err(|source| ComposeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self =
            serde_json::from_slice(&data).map_err(|source| ComposeError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!(path = %path.display(), "loaded composer config");
        Ok(config)
    }
}

/// Get the path of the composer config file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deskchat").join("compose.json"))
}

/// Process-wide config used by the C ABI. A broken file is logged and ignored.
pub static GLOBAL: Lazy<ComposeConfig> = Lazy::new(|| {
    ComposeConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable composer config");
        ComposeConfig::default()
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ComposeConfig::load_from(&dir.path().join("compose.json")).unwrap();
        assert_eq!(config, ComposeConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.json");
        fs::write(&path, r#"{"max_ticket_suggestions": 5, "empty_query_sampling": "first_n"}"#)
            .unwrap();

        let config = ComposeConfig::load_from(&path).unwrap();
        assert_eq!(config.max_ticket_suggestions, 5);
        assert_eq!(config.empty_query_sampling, EmptyQuerySampling::FirstN);
        assert_eq!(config.max_mention_suggestions, 3);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compose.json");
        fs::write(&path, "{not json").unwrap();

        let err = ComposeConfig::load_from(&path).unwrap_err();
        assert_eq!(err.kind(), "config_parse");
    }
}
