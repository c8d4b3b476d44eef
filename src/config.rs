//! `~/.fomo.toml` loading.
//!
//! ```toml
//! [zabbix]
//! url = "https://zabbix.example.com"
//! api_key = "..."
//!
//! [aws]
//! region = "us-east-1"
//! ```

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::{FomoError, Result};

pub const CONFIG_FILE_NAME: &str = ".fomo.toml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct FomoConfig {
    #[serde(default)]
    pub zabbix: ZabbixConfig,
    #[serde(default)]
    pub aws: AwsConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ZabbixConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct AwsConfig {
    #[serde(default)]
    pub region: Option<String>,
}

/// Where a connection parameter came from, for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Specified,
    File(PathBuf),
    Missing,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specified => write!(f, "specified"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Missing => write!(f, "nowhere"),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

impl FomoConfig {
    /// Reads the config at `path`. A missing file yields the empty config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| {
            tracing::error!("error loading {}: {e}", path.display());
            FomoError::Toml(e)
        })?;
        Ok(config)
    }

    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        match default_config_path() {
            Some(path) => Ok((Self::load_from(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

/// Picks the explicit value when it is non-empty, else the configured one.
pub fn resolve(
    explicit: Option<&str>,
    configured: Option<&str>,
    config_path: Option<&Path>,
) -> (String, ConfigSource) {
    match explicit.filter(|v| !v.trim().is_empty()) {
        Some(v) => (v.to_string(), ConfigSource::Specified),
        None => match (configured.filter(|v| !v.trim().is_empty()), config_path) {
            (Some(v), Some(path)) => (v.to_string(), ConfigSource::File(path.to_path_buf())),
            (Some(v), None) => (v.to_string(), ConfigSource::Specified),
            (None, _) => (String::new(), ConfigSource::Missing),
        },
    }
}
