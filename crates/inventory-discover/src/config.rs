//! Scan and query settings for the inventory run.

use std::time::Duration;

use inventory_eapi::{ClientConfig, Scheme};
use serde::Deserialize;

use crate::scanner::DEFAULT_MAX_IN_FLIGHT;

/// Settings loaded from the optional `[scan]` section of the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ScanSettings {
    /// Maximum probes in flight at once.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// Per-probe timeout in seconds.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Per-command request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Devices queried concurrently while building the report.
    #[serde(default = "default_query_concurrency")]
    pub query_concurrency: usize,

    /// Skip TLS certificate validation (devices use self-signed certificates).
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    /// Use HTTPS (the default) or plain HTTP.
    #[serde(default = "default_true")]
    pub use_https: bool,

    /// Non-standard API port.
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_max_in_flight() -> usize {
    DEFAULT_MAX_IN_FLIGHT
}

fn default_probe_timeout_secs() -> u64 {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_query_concurrency() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            probe_timeout_secs: default_probe_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            query_concurrency: default_query_concurrency(),
            accept_invalid_certs: true,
            use_https: true,
            port: None,
        }
    }
}

impl ScanSettings {
    fn client_config(&self, timeout_secs: u64) -> ClientConfig {
        ClientConfig {
            scheme: if self.use_https { Scheme::Https } else { Scheme::Http },
            port: self.port,
            request_timeout: Duration::from_secs(timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }

    /// Client settings for reachability probes.
    pub fn probe_config(&self) -> ClientConfig {
        self.client_config(self.probe_timeout_secs)
    }

    /// Client settings for command queries.
    pub fn query_config(&self) -> ClientConfig {
        self.client_config(self.request_timeout_secs)
    }
}
