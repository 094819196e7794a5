//! Configuration file support for taskbridge.
//!
//! Two locations are read:
//! - Global: `~/.taskbridge/config.toml` - User-wide defaults
//! - Project: `.taskbridge/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::Config;

/// On-disk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Provider settings
    pub providers: ProvidersConfig,
}

/// The `[providers]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider used for bare references (e.g. "file")
    pub default: Option<String>,

    /// Per-provider tables, e.g. `[providers.gitlab]`
    #[serde(flatten)]
    pub tables: HashMap<String, toml::Table>,
}

impl FileConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: FileConfig) {
        if other.providers.default.is_some() {
            self.providers.default = other.providers.default;
        }
        for (name, table) in other.providers.tables {
            let merged = self.providers.tables.entry(name).or_default();
            for (key, value) in table {
                merged.insert(key, value);
            }
        }
    }

    /// Lower one provider's table into runtime [`Config`] options.
    pub fn provider_config(&self, name: &str) -> Config {
        let mut config = Config::new();
        if let Some(table) = self.providers.tables.get(name) {
            for (key, value) in table {
                config = config.set(key.clone(), toml_to_json(value.clone()));
            }
        }
        config
    }
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.taskbridge/config.toml)
/// 2. Global config (~/.taskbridge/config.toml)
/// 3. Defaults
pub fn load_merged(global_path: Option<&Path>, project_path: &Path) -> FileConfig {
    let mut config = FileConfig::default();

    if let Some(global) = global_path {
        if global.exists() {
            config.merge(FileConfig::load_or_default(global));
        }
    }

    if project_path.exists() {
        config.merge(FileConfig::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.taskbridge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".taskbridge"))
}

/// Get the global config path (~/.taskbridge/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.taskbridge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".taskbridge").join("config.toml")
}
