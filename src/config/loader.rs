//! Configuration loading and merging logic
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides
//! 2. Config file
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::schema::Config;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    pub fn load() -> Result<Config> {
        let mut config = Config::default();

        if let Some(path) = Self::config_path() {
            if path.exists() {
                config = Self::load_file(&path)?;
            }
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Built-in defaults only
    pub fn load_defaults() -> Config {
        Config::default()
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Location of the config file (~/.config/crossgraph/config.yaml)
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "crossgraph")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(ns) = std::env::var("CROSSGRAPH_NAMESPACE") {
            if !ns.is_empty() {
                config.default_namespace = ns;
            }
        }
        if let Ok(fan_out) = std::env::var("CROSSGRAPH_FAN_OUT") {
            if let Ok(n) = fan_out.parse() {
                config.fan_out = n;
            }
        }
        if let Ok(timeout) = std::env::var("CROSSGRAPH_TIMEOUT_SECONDS") {
            if let Ok(n) = timeout.parse() {
                config.timeout_seconds = n;
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.default_namespace, "default");
        assert_eq!(config.fan_out, 8);
        assert_eq!(config.timeout_seconds, 0);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config: Config = serde_yaml::from_str("defaultNamespace: team-a\n").unwrap();
        assert_eq!(config.default_namespace, "team-a");
        assert_eq!(config.fan_out, 8);
    }
}
