//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Ambient namespace for root lookups
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// Bounded concurrency for sibling fetches
    #[serde(default = "default_fan_out")]
    pub fan_out: usize,

    /// Overall resolution deadline in seconds; 0 disables it
    #[serde(default)]
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            fan_out: default_fan_out(),
            timeout_seconds: 0,
        }
    }
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_fan_out() -> usize {
    8
}
