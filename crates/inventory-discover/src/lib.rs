//! inventory-discover: finds devices exposing the JSON-RPC command API in a
//! subnet and builds an inventory report from them.
//!
//! The scan probes every usable host address concurrently, bounded by a
//! semaphore, and returns the responsive addresses in ascending order.

pub mod config;
pub mod error;
pub mod probe;
pub mod report;
pub mod scanner;
pub mod subnet;
pub mod table;

pub use error::{DiscoverError, Result};
pub use probe::{HostProbe, HttpsProbe};
pub use scanner::SubnetScanner;
pub use subnet::Subnet;
