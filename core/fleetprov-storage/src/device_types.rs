//! Accepted device types and their background refresh.
//!
//! The firmware service publishes the list of device types the platform
//! knows about. [`DeviceTypeRefresher`] polls it and swaps the result into a
//! shared [`DeviceTypeCache`]; request handlers only ever read the cache.

use crate::config::FirmwareServiceConfig;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Device type that matches anything where wildcards are allowed.
pub const WILDCARD: &str = "*";

/// Last known set of device types.
#[derive(Debug, Clone, Default)]
pub struct DeviceTypeCache {
    types: Arc<RwLock<BTreeSet<String>>>,
}

impl DeviceTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, types: BTreeSet<String>) {
        match self.types.write() {
            Ok(mut guard) => *guard = types,
            Err(poisoned) => *poisoned.into_inner() = types,
        }
    }

    pub fn snapshot(&self) -> BTreeSet<String> {
        match self.types.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `device_type` is known. Until the first successful refresh the
    /// cache is empty and knows nothing.
    pub fn is_acceptable(&self, device_type: &str) -> bool {
        let types = match self.types.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        types.contains(device_type)
    }

    /// Whether every entry of `device_types` is acceptable. `*` passes only
    /// when `wildcard_allowed`.
    pub fn are_acceptable<S: AsRef<str>>(&self, device_types: &[S], wildcard_allowed: bool) -> bool {
        device_types.iter().all(|t| {
            let t = t.as_ref();
            (wildcard_allowed && t == WILDCARD) || self.is_acceptable(t)
        })
    }
}

/// Why a refresh produced no update.
#[derive(Debug, Error)]
pub enum FirmwareError {
    #[error("firmware service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("firmware service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("firmware service response has no deviceTypes array")]
    MissingDeviceTypes,
}

#[derive(Debug, Deserialize)]
struct DeviceSetResponse {
    #[serde(rename = "deviceTypes")]
    device_types: Option<Vec<String>>,
}

/// Client for the firmware service's device-set endpoint.
#[derive(Debug, Clone)]
pub struct FirmwareClient {
    client: reqwest::Client,
    base_url: String,
}

impl FirmwareClient {
    pub fn new(config: &FirmwareServiceConfig) -> Result<Self, FirmwareError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_device_types(&self) -> Result<BTreeSet<String>, FirmwareError> {
        let url = format!("{}/api/v1/firmwares", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("deviceSet", "true")])
            .send()
            .await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(FirmwareError::Status(response.status()));
        }
        let body: DeviceSetResponse = response.json().await?;
        let types = body.device_types.ok_or(FirmwareError::MissingDeviceTypes)?;
        Ok(types.into_iter().collect())
    }
}

/// Sleep intervals between refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntervals {
    /// After a successful fetch.
    pub refresh: Duration,
    /// After a failed fetch.
    pub retry: Duration,
}

impl From<&FirmwareServiceConfig> for RefreshIntervals {
    fn from(config: &FirmwareServiceConfig) -> Self {
        Self {
            refresh: config.refresh_interval(),
            retry: config.retry_interval(),
        }
    }
}

/// Handle to the background refresh task.
pub struct DeviceTypeRefresher {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl DeviceTypeRefresher {
    /// Spawns the refresh loop. It fetches immediately, then sleeps
    /// `intervals.refresh` after a success or `intervals.retry` after a
    /// failure. A failed fetch keeps the previous set.
    pub fn spawn(client: FirmwareClient, cache: DeviceTypeCache, intervals: RefreshIntervals) -> Self {
        let shutdown = Arc::new(Notify::new());
        let signal = Arc::clone(&shutdown);
        let handle = tokio::spawn(async move {
            info!(base_url = %client.base_url, "device type refresher started");
            loop {
                let delay = tokio::select! {
                    _ = signal.notified() => break,
                    result = client.fetch_device_types() => match result {
                        Ok(types) => {
                            info!(count = types.len(), "device types updated");
                            cache.replace(types);
                            intervals.refresh
                        }
                        Err(e) => {
                            warn!(error = %e, "device type refresh failed, keeping previous set");
                            intervals.retry
                        }
                    },
                };
                debug!(?delay, "next device type refresh scheduled");
                tokio::select! {
                    _ = signal.notified() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            info!("device type refresher stopped");
        });
        Self { shutdown, handle }
    }

    /// Signals the task and waits for it to finish.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "device type refresher ended abnormally");
        }
    }
}
