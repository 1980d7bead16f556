//! Core domain types for the device inventory.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Credentials ───────────────────────────────────────────────────

/// Username/password pair passed to the device API as HTTP basic auth.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ── Device Snapshot ───────────────────────────────────────────────

/// Identity and status of one device, assembled from the `show hostname`,
/// `show version` and `show ip interface management1` replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub hostname: String,
    pub model: String,
    pub software_version: String,
    pub architecture: String,
    pub mac_address: String,
    pub serial_number: String,
    pub management_ip: String,
}

/// Outcome shown in the status column of the report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceStatus {
    Ok,
    Error,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}
