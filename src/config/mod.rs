//! Configuration handling for on-save-hook.
//!
//! Configuration is optional. An `on-save.toml` found in the working
//! directory or any parent overrides the defaults.

use crate::core::detector::PackageManager;
use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "on-save.toml";

/// Default lifetime of a cached dependency preflight verdict.
pub const DEFAULT_CACHE_TTL: &str = "5m";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package manager used to run the tools. Detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<PackageManager>,
    /// How long a dependency preflight verdict stays valid.
    pub cache_ttl: String,
    /// Directory for the daily log files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// Lint settings.
    pub lint: LintConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            package_manager: None,
            cache_ttl: DEFAULT_CACHE_TTL.to_string(),
            log_dir: None,
            lint: LintConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;
        Self::load_or_default_from(&cwd)
    }

    /// Like [`load_or_default`](Self::load_or_default), searching upwards
    /// from `start` instead of the working directory.
    pub fn load_or_default_from(start: &Path) -> Result<Self> {
        match Self::find_config_file(start) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                Self::load_from(&path)
            },
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                Error::config_parse(format!("{} is not valid UTF-8", path.display()))
            } else {
                Error::io("read config", e)
            }
        })?;
        Self::parse(&content)
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file(start: &Path) -> Result<PathBuf> {
        let mut current = start;
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Ok(config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Err(Error::ConfigNotFound {
            path: start.join(CONFIG_FILE_NAME),
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if humantime::parse_duration(&self.cache_ttl).is_err() {
            return Err(Error::ConfigInvalid {
                field: "cache_ttl".to_string(),
                message: format!("Invalid duration: {}", self.cache_ttl),
            });
        }

        Ok(())
    }

    /// Returns the preflight cache lifetime.
    ///
    /// Falls back to the default when the value does not parse; [`validate`]
    /// rejects such configurations at load time.
    ///
    /// [`validate`]: Self::validate
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        humantime::parse_duration(&self.cache_ttl).unwrap_or_else(|_| {
            tracing::warn!(
                cache_ttl = %self.cache_ttl,
                default = DEFAULT_CACHE_TTL,
                "Invalid cache TTL, using default"
            );
            Duration::from_secs(300)
        })
    }

    /// Generates default configuration as a string.
    #[must_use]
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Lint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Run the linter after the type check on single files.
    pub enabled: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
