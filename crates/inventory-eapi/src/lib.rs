//! inventory-eapi: client for the JSON-RPC command API exposed by network
//! devices at `/command-api`.
//!
//! Every command call goes through [`EapiClient`], which holds one HTTP
//! session per device (basic auth and certificate policy are set once).

pub mod client;
pub mod envelope;

pub use client::{ClientConfig, CommandOutput, EapiClient, EapiError, OutputMode, Scheme};
pub use envelope::RunCmdsRequest;
