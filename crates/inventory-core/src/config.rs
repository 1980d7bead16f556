//! INI-backed configuration source.
//!
//! Values are loaded from (in priority order):
//! 1. Environment variables (`INVENTORY__<SECTION>__<KEY>`)
//! 2. The INI file (default `config.ini`)
//!
//! Credentials live in the `[network-api]` section with `user` and
//! `password` keys. Other sections are deserialized on demand.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::de::DeserializeOwned;

use crate::error::InventoryError;
use crate::types::Credentials;

/// Default INI file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.ini";

/// Default section holding the device API credentials.
pub const DEFAULT_CREDENTIALS_SECTION: &str = "network-api";

/// A loaded configuration file plus environment overrides.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    cfg: Config,
    path: PathBuf,
}

impl ConfigSource {
    /// Load the INI file at `path`. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref().to_path_buf();
        let cfg = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini).required(true))
            .add_source(Environment::with_prefix("INVENTORY").separator("__"))
            .build()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(Self { cfg, path })
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the credentials stored in `section`.
    ///
    /// Fails with [`InventoryError::MissingSection`] if the section is absent,
    /// and with [`InventoryError::Config`] if it lacks `user` or `password`.
    pub fn credentials(&self, section: &str) -> Result<Credentials, InventoryError> {
        self.section::<Credentials>(section)?
            .ok_or_else(|| InventoryError::MissingSection {
                section: section.to_string(),
                file: self.path.display().to_string(),
            })
    }

    /// Deserialize an optional section. Returns `Ok(None)` when it is absent.
    pub fn section<T: DeserializeOwned>(&self, section: &str) -> Result<Option<T>, InventoryError> {
        match self.cfg.get::<T>(section) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
