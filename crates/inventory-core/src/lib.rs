//! inventory-core: Shared types, credential loading, and error handling for
//! the eAPI inventory tool.
//!
//! This crate provides the pieces every other crate in the workspace needs:
//! - Device snapshot and status types produced by the report
//! - Credentials and the INI-backed configuration source
//! - The common error type

pub mod config;
pub mod error;
pub mod types;

pub use crate::config::ConfigSource;
pub use crate::error::InventoryError;
pub use crate::types::{Credentials, DeviceSnapshot, DeviceStatus};
