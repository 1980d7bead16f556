//! Reachability probe for the command API.
//!
//! A host counts as reachable only when `GET /explorer.html` answers with
//! exactly `200 OK`. Refused connections, TLS failures, timeouts and any
//! other status are ordinary negative verdicts, not errors.

use std::net::Ipv4Addr;

use async_trait::async_trait;
use inventory_eapi::ClientConfig;
use reqwest::StatusCode;

use crate::error::Result;

/// Diagnostic page served by devices with the command API enabled.
pub const PROBE_PATH: &str = "/explorer.html";

/// Decides whether a single address exposes the command API.
#[async_trait]
pub trait HostProbe: Send + Sync + 'static {
    async fn probe(&self, addr: Ipv4Addr) -> bool;
}

/// HTTP(S) probe backed by one shared `reqwest::Client`.
pub struct HttpsProbe {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpsProbe {
    /// Build the probe. `config.request_timeout` bounds each probe end to end.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn url(&self, addr: Ipv4Addr) -> String {
        format!("{}{PROBE_PATH}", self.config.base_url(&addr.to_string()))
    }
}

#[async_trait]
impl HostProbe for HttpsProbe {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        match self.http.get(self.url(addr)).send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(addr = %addr, status = status.as_u16(), "Probe answered");
                status == StatusCode::OK
            }
            Err(e) => {
                tracing::debug!(addr = %addr, error = %e, timeout = e.is_timeout(), "Probe failed");
                false
            }
        }
    }
}
