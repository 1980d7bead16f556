//! JSON-RPC request envelope for the `runCmds` method.
//!
//! Field names and constant values are part of the device's API contract.

use serde::Serialize;

pub const JSONRPC_VERSION: &str = "2.0";
pub const RUN_CMDS_METHOD: &str = "runCmds";
pub const REQUEST_ID: &str = "CaptainApi";
pub const API_VERSION: u32 = 1;

/// Request body posted to `/command-api`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunCmdsRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: RunCmdsParams,
    pub id: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunCmdsParams {
    pub format: &'static str,
    pub timestamps: bool,
    pub auto_complete: bool,
    pub cmds: Vec<String>,
    pub version: u32,
}

impl RunCmdsRequest {
    pub fn new<S: AsRef<str>>(cmds: &[S]) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method: RUN_CMDS_METHOD,
            params: RunCmdsParams {
                format: "json",
                timestamps: false,
                auto_complete: true,
                cmds: cmds.iter().map(|c| c.as_ref().to_string()).collect(),
                version: API_VERSION,
            },
            id: REQUEST_ID,
        }
    }
}
