//! Global configuration: shared settings applied before any plugin resolves.
//!
//! The `global` sub-document is handled through the same discriminated
//! mechanism as plugins: processors register under a field name, write-once,
//! and each is invoked with that field's sub-document (or `None` when the
//! field is absent). The built-in processor handles `certificates`, which
//! feeds the TLS trust material used by HTTP-based plugins.

use std::path::PathBuf;

use anyhow::anyhow;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, RigupError};

/// Shared global state produced from the `global` sub-document.
#[derive(Debug, Default)]
pub struct GlobalConfig {
    ca_pems: Vec<Vec<u8>>,
}

impl GlobalConfig {
    /// Add a PEM-encoded certificate authority to the trust set. The PEM is
    /// parsed eagerly so a bad certificate fails resolution, not the first
    /// download. Input with zero certificate blocks is rejected; the rustls
    /// backend would otherwise accept it and trust nothing.
    pub fn add_certificate_pem(&mut self, pem: Vec<u8>) -> Result<()> {
        let certs =
            reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| RigupError::Certificate {
                message: format!("failed to parse CA certificate: {e}"),
            })?;
        if certs.is_empty() {
            return Err(RigupError::Certificate {
                message: "no certificate blocks found in PEM input".to_string(),
            });
        }
        self.ca_pems.push(pem);
        Ok(())
    }

    /// Number of additional trust roots configured.
    pub fn certificate_count(&self) -> usize {
        self.ca_pems.len()
    }

    /// An HTTP client preconfigured to trust the system roots plus every
    /// additional certificate authority from the global config.
    pub fn http_client(&self) -> Result<reqwest::blocking::Client> {
        let mut builder = reqwest::blocking::Client::builder();
        for pem in &self.ca_pems {
            let certs =
                reqwest::Certificate::from_pem_bundle(pem).map_err(|e| RigupError::Certificate {
                    message: format!("failed to parse CA certificate: {e}"),
                })?;
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }
        Ok(builder.build()?)
    }
}

/// Processor for one field of the `global` sub-document. Invoked with `None`
/// when the field is absent; processors must treat that as a no-op.
pub type GlobalProcessor = fn(field: &str, value: Option<&Value>, global: &mut GlobalConfig) -> Result<()>;

/// Write-once, field-name-keyed registry of global processors.
pub struct GlobalProcessors {
    entries: Vec<(String, GlobalProcessor)>,
}

impl GlobalProcessors {
    /// An empty processor registry.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// The registry with the built-in `certificates` processor.
    pub fn builtin() -> Self {
        let mut processors = Self::new();
        processors
            .register("certificates", certificates_processor)
            .unwrap_or_else(|_| unreachable!("empty registry"));
        processors
    }

    /// Register a processor under a field name. Fails if the field is
    /// already claimed.
    pub fn register(&mut self, field: &str, processor: GlobalProcessor) -> Result<()> {
        if self.entries.iter().any(|(f, _)| f == field) {
            return Err(RigupError::Other(anyhow!(
                "global config field `{field}` is already registered"
            )));
        }
        self.entries.push((field.to_string(), processor));
        Ok(())
    }

    /// Run every processor against the `global` sub-document of `document`.
    /// A document without a `global` key processes everything with `None`.
    pub fn process(&self, document: &Value, global: &mut GlobalConfig) -> Result<()> {
        let global_doc = document.get("global");
        for (field, processor) in &self.entries {
            let value = global_doc.and_then(|g| g.get(field));
            processor(field, value, global)?;
        }
        Ok(())
    }
}

impl Default for GlobalProcessors {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Default, Deserialize)]
struct CertificatesConfig {
    #[serde(default)]
    additional_certificate_authorities: Vec<String>,
    #[serde(default)]
    additional_certificate_authorities_files: Vec<PathBuf>,
}

fn certificates_processor(
    field: &str,
    value: Option<&Value>,
    global: &mut GlobalConfig,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let config: CertificatesConfig =
        serde_json::from_value(value.clone()).map_err(|e| RigupError::ConfigDecode {
            component: format!("global.{field}"),
            message: e.to_string(),
        })?;
    for pem in config.additional_certificate_authorities {
        global.add_certificate_pem(pem.into_bytes())?;
    }
    for path in config.additional_certificate_authorities_files {
        let data = std::fs::read(&path).map_err(|e| RigupError::Certificate {
            message: format!("failed to read CA file {}: {e}", path.display()),
        })?;
        global.add_certificate_pem(data)?;
    }
    Ok(())
}
