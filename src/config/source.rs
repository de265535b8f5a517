//! Configuration sources: where the raw config document comes from.
//!
//! Exactly one config source is selected by type name at process start
//! (`--config-source`). The `local` plugin reads a JSON file named by
//! `--config`; `embedded` serves a preloaded document and exists mainly for
//! tests and custom builds that compile their configuration in.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::{Result, RigupError};

/// Produces the raw untyped configuration document.
pub trait ConfigSource {
    fn read_config(&self) -> Result<Value>;
}

/// Inputs available to config source factories, gathered from the CLI (or
/// the embedding program) before configuration exists.
#[derive(Debug, Default, Clone)]
pub struct ConfigSourceOptions {
    /// `--config` path, for file-based sources.
    pub path: Option<PathBuf>,
    /// Preloaded document, for the embedded source.
    pub document: Option<Value>,
}

/// Reads a JSON configuration file from the local filesystem.
pub struct LocalConfigSource {
    path: PathBuf,
}

impl ConfigSource for LocalConfigSource {
    fn read_config(&self) -> Result<Value> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| RigupError::ConfigLoad {
            message: format!("reading {}: {e}", self.path.display()),
        })?;
        serde_json::from_str(&data).map_err(|e| RigupError::ConfigLoad {
            message: format!("parsing {}: {e}", self.path.display()),
        })
    }
}

/// Factory for the `local` config source plugin.
pub fn local_loader(options: &ConfigSourceOptions) -> Result<Box<dyn ConfigSource>> {
    let path = options.path.clone().ok_or_else(|| RigupError::ConfigLoad {
        message: "local config source requires a --config path".to_string(),
    })?;
    Ok(Box::new(LocalConfigSource { path }))
}

/// Serves a document loaded ahead of time.
pub struct EmbeddedConfigSource {
    document: Value,
}

impl EmbeddedConfigSource {
    pub fn new(document: Value) -> Self {
        Self { document }
    }
}

impl ConfigSource for EmbeddedConfigSource {
    fn read_config(&self) -> Result<Value> {
        Ok(self.document.clone())
    }
}

/// Factory for the `embedded` config source plugin.
pub fn embedded_loader(options: &ConfigSourceOptions) -> Result<Box<dyn ConfigSource>> {
    let document = options
        .document
        .clone()
        .ok_or_else(|| RigupError::ConfigLoad {
            message: "embedded config source requires a preloaded document".to_string(),
        })?;
    Ok(Box::new(EmbeddedConfigSource::new(document)))
}
