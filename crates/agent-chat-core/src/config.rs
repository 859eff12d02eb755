//! Local configuration: credential and default routing.
//!
//! Held outside the message store, loaded at startup and overwritten on
//! an explicit save. Injected into the client and resolver at
//! construction rather than read from ambient global state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SourceContext;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("No user config directory available")]
    NoConfigDir,
}

/// Credential and default-routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Remote agent API key; empty means unset.
    pub api_key: String,
    /// Default repository owner for new sessions.
    pub github_owner: Option<String>,
    /// Default repository name for new sessions.
    pub github_repo: Option<String>,
    /// Default starting branch for new sessions.
    pub github_branch: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            github_owner: None,
            github_repo: None,
            github_branch: "main".to_string(),
        }
    }
}

impl AgentConfig {
    /// The default routing as a source context for session creation.
    #[must_use]
    pub fn source_context(&self) -> SourceContext {
        SourceContext {
            owner: self.github_owner.clone(),
            repo: self.github_repo.clone(),
            branch: self.github_branch.clone(),
        }
    }

    /// Path of the per-user config file.
    ///
    /// # Errors
    /// Returns `NoConfigDir` when the platform provides no config dir.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("agent-chat").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    /// Returns `Io` if the file is unreadable, `Malformed` if it does
    /// not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Load from the default path, falling back to defaults when the
    /// file does not exist yet.
    ///
    /// # Errors
    /// Returns `NoConfigDir` or any error from [`Self::load`].
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns `Io` if the write fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Save to the default path.
    ///
    /// # Errors
    /// Returns `NoConfigDir` or any error from [`Self::save`].
    pub fn save_default(&self) -> Result<(), ConfigError> {
        self.save(&Self::default_path()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_empty_with_main_branch() {
        let config = AgentConfig::default();
        assert!(config.api_key.is_empty());
        assert_eq!(config.github_branch, "main");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: AgentConfig = serde_json::from_str("{\"api_key\": \"k\"}").unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.github_branch, "main");
        assert!(config.github_owner.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AgentConfig {
            api_key: "secret".to_string(),
            github_owner: Some("octocat".to_string()),
            github_repo: Some("hello-world".to_string()),
            github_branch: "dev".to_string(),
        };
        config.save(&path).unwrap();

        assert_eq!(AgentConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn source_context_mirrors_routing_fields() {
        let config = AgentConfig {
            github_owner: Some("octocat".to_string()),
            ..AgentConfig::default()
        };
        let ctx = config.source_context();
        assert_eq!(ctx.owner.as_deref(), Some("octocat"));
        assert_eq!(ctx.branch, "main");
    }
}
