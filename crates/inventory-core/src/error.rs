use thiserror::Error;

/// Top-level error type for configuration and credential handling.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Section [{section}] not found in {file}")]
    MissingSection { section: String, file: String },
}
