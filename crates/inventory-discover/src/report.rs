//! Inventory assembly: query each responsive device and extract a
//! [`DeviceSnapshot`] from its command replies.
//!
//! A device whose query fails, or whose replies lack an expected field, is
//! logged and reported as an error row. It never aborts the whole report.

use std::net::Ipv4Addr;
use std::sync::Arc;

use inventory_core::{Credentials, DeviceSnapshot, DeviceStatus};
use inventory_eapi::{ClientConfig, EapiClient, EapiError};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const SHOW_HOSTNAME: &str = "show hostname";
pub const SHOW_VERSION: &str = "show version";
pub const SHOW_MGMT_INTERFACE: &str = "show ip interface management1";

const HOSTNAME: &str = "/result/0/hostname";
const MODEL: &str = "/result/0/modelName";
const VERSION: &str = "/result/0/version";
const ARCHITECTURE: &str = "/result/0/architecture";
const MAC_ADDRESS: &str = "/result/0/systemMacAddress";
const SERIAL_NUMBER: &str = "/result/0/serialNumber";
const MGMT_ADDRESS: &str = "/result/0/interfaces/Management1/interfaceAddress/primaryIp/address";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Eapi(#[from] EapiError),

    #[error("'{command}' reply has no string at {pointer}")]
    MissingField { command: String, pointer: String },

    #[error("Query task failed: {0}")]
    Task(String),
}

/// One line of the inventory report.
#[derive(Debug)]
pub struct InventoryRow {
    /// Address the device answered on during the scan.
    pub address: Ipv4Addr,
    pub snapshot: Result<DeviceSnapshot, ReportError>,
}

impl InventoryRow {
    pub fn status(&self) -> DeviceStatus {
        match self.snapshot {
            Ok(_) => DeviceStatus::Ok,
            Err(_) => DeviceStatus::Error,
        }
    }
}

fn field(reply: &Value, command: &str, pointer: &str) -> Result<String, ReportError> {
    reply
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ReportError::MissingField {
            command: command.to_string(),
            pointer: pointer.to_string(),
        })
}

/// Build a snapshot from the three process-mode replies.
pub fn snapshot_from_replies(
    hostname: &Value,
    version: &Value,
    interface: &Value,
) -> Result<DeviceSnapshot, ReportError> {
    Ok(DeviceSnapshot {
        hostname: field(hostname, SHOW_HOSTNAME, HOSTNAME)?,
        model: field(version, SHOW_VERSION, MODEL)?,
        software_version: field(version, SHOW_VERSION, VERSION)?,
        architecture: field(version, SHOW_VERSION, ARCHITECTURE)?,
        mac_address: field(version, SHOW_VERSION, MAC_ADDRESS)?,
        serial_number: field(version, SHOW_VERSION, SERIAL_NUMBER)?,
        management_ip: field(interface, SHOW_MGMT_INTERFACE, MGMT_ADDRESS)?,
    })
}

/// Query one device. Commands are sent one per request, in order.
pub async fn collect_snapshot(client: &EapiClient) -> Result<DeviceSnapshot, ReportError> {
    let hostname = client.run_json(&[SHOW_HOSTNAME]).await?;
    let version = client.run_json(&[SHOW_VERSION]).await?;
    let interface = client.run_json(&[SHOW_MGMT_INTERFACE]).await?;
    snapshot_from_replies(&hostname, &version, &interface)
}

async fn query_device(
    address: Ipv4Addr,
    credentials: Credentials,
    config: ClientConfig,
) -> InventoryRow {
    let snapshot = match EapiClient::new(address.to_string(), credentials, &config) {
        Ok(client) => collect_snapshot(&client).await,
        Err(e) => Err(e.into()),
    };

    match &snapshot {
        Ok(s) => tracing::info!(addr = %address, hostname = %s.hostname, "Device queried"),
        Err(e) => tracing::warn!(addr = %address, error = %e, "Device query failed, skipping"),
    }

    InventoryRow { address, snapshot }
}

/// Query every address with at most `concurrency` devices in flight.
/// Rows come back in the order of `addresses`.
pub async fn build_inventory(
    addresses: &[Ipv4Addr],
    credentials: &Credentials,
    config: &ClientConfig,
    concurrency: usize,
) -> Vec<InventoryRow> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut queries = JoinSet::new();

    for (index, address) in addresses.iter().copied().enumerate() {
        let permits = permits.clone();
        let credentials = credentials.clone();
        let config = config.clone();
        queries.spawn(async move {
            let _permit = permits.acquire_owned().await;
            (index, query_device(address, credentials, config).await)
        });
    }

    let mut slots: Vec<Option<InventoryRow>> = addresses.iter().map(|_| None).collect();
    while let Some(joined) = queries.join_next().await {
        match joined {
            Ok((index, row)) => slots[index] = Some(row),
            Err(e) => tracing::error!(error = %e, "Device query task panicked"),
        }
    }

    slots
        .into_iter()
        .zip(addresses)
        .map(|(slot, &address)| {
            slot.unwrap_or_else(|| InventoryRow {
                address,
                snapshot: Err(ReportError::Task("query task did not complete".into())),
            })
        })
        .collect()
}
