//! Command API session and request execution.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use inventory_core::Credentials;
use serde::Serialize;
use serde_json::Value;

use crate::envelope::RunCmdsRequest;

/// Path of the JSON-RPC endpoint on every device.
pub const COMMAND_PATH: &str = "/command-api";

/// Errors from command API calls. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum EapiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Device returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON in device response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Device rejected the request (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Unknown output mode: {0} (expected 'process' or 'display')")]
    UnknownOutputMode(String),
}

/// URL scheme used to reach the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Https,
    Http,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Connection settings shared by every session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub scheme: Scheme,
    /// Explicit port; the scheme's default when `None`.
    pub port: Option<u16>,
    pub request_timeout: Duration,
    /// Skip TLS certificate validation. Devices ship with self-signed
    /// certificates, so this is on unless the operator opts out.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Https,
            port: None,
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        }
    }
}

impl ClientConfig {
    /// Base URL (`scheme://host[:port]`) for `host`.
    pub fn base_url(&self, host: &str) -> String {
        match self.port {
            Some(port) => format!("{}://{host}:{port}", self.scheme),
            None => format!("{}://{host}", self.scheme),
        }
    }
}

/// How a command reply is handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Parsed JSON for programmatic field extraction.
    #[default]
    Process,
    /// Indented JSON text for humans.
    Display,
}

impl FromStr for OutputMode {
    type Err = EapiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "process" => Ok(Self::Process),
            "display" => Ok(Self::Display),
            _ => Err(EapiError::UnknownOutputMode(s.to_string())),
        }
    }
}

/// Reply to a `runCmds` call in the requested [`OutputMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Structured(Value),
    Display(String),
}

/// One logical session with a single device.
///
/// Clone is cheap (the inner HTTP client is reference counted).
#[derive(Debug, Clone)]
pub struct EapiClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

impl EapiClient {
    /// Build a session for `host`. No network traffic happens here.
    pub fn new(
        host: impl AsRef<str>,
        credentials: Credentials,
        config: &ClientConfig,
    ) -> Result<Self, EapiError> {
        let http = reqwest::Client::builder()
            .no_proxy()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}{COMMAND_PATH}", config.base_url(host.as_ref())),
            credentials,
        })
    }

    /// Full URL of the command endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `cmds` on the device in a single request.
    ///
    /// The reply's `result` array holds one entry per command, in order.
    pub async fn run_commands<S: AsRef<str>>(
        &self,
        cmds: &[S],
        mode: OutputMode,
    ) -> Result<CommandOutput, EapiError> {
        let value = self.post(&RunCmdsRequest::new(cmds)).await?;
        match mode {
            OutputMode::Process => Ok(CommandOutput::Structured(value)),
            OutputMode::Display => Ok(CommandOutput::Display(to_display_text(&value)?)),
        }
    }

    /// [`run_commands`](Self::run_commands) in process mode.
    pub async fn run_json<S: AsRef<str>>(&self, cmds: &[S]) -> Result<Value, EapiError> {
        self.post(&RunCmdsRequest::new(cmds)).await
    }

    /// [`run_commands`](Self::run_commands) in display mode.
    pub async fn run_display<S: AsRef<str>>(&self, cmds: &[S]) -> Result<String, EapiError> {
        let value = self.post(&RunCmdsRequest::new(cmds)).await?;
        Ok(to_display_text(&value)?)
    }

    async fn post(&self, request: &RunCmdsRequest) -> Result<Value, EapiError> {
        tracing::debug!(endpoint = %self.endpoint, cmds = ?request.params.cmds, "Sending runCmds");

        let response = self
            .http
            .post(&self.endpoint)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EapiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        if let Some(error) = value.get("error") {
            return Err(EapiError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }

        Ok(value)
    }
}

/// Render `value` as JSON indented by three spaces per level.
pub fn to_display_text(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
