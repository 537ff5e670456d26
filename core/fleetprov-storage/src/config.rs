//! Storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration of the provisioning store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database: DatabaseConfig,
    /// Device-type refresh is disabled when absent.
    pub firmware: Option<FirmwareServiceConfig>,
}

impl StorageConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    /// How long a writer waits on a locked file (ms).
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Where and how often to fetch the accepted device types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmwareServiceConfig {
    /// Base URL of the firmware service (e.g. `https://fms.example.com`).
    pub base_url: String,
    /// Timeout for one fetch (ms).
    pub request_timeout_ms: u64,
    /// Delay after a failed fetch (ms).
    pub retry_interval_ms: u64,
    /// Delay after a successful fetch (ms).
    pub refresh_interval_ms: u64,
}

impl Default for FirmwareServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_ms: 5_000,
            retry_interval_ms: 2_000,
            refresh_interval_ms: 300_000,
        }
    }
}

impl FirmwareServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
