//! Error types for rigup operations.
//!
//! This module defines [`RigupError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Resolution errors (missing keys, unknown types, decode failures) abort
//!   configuration loading before any step runs
//! - Acquisition and execution errors bubble unchanged from leaf plugins to
//!   the engine; the engine never retries
//! - Use `anyhow::Error` (via `RigupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rigup operations.
#[derive(Debug, Error)]
pub enum RigupError {
    /// A logger/step config fragment has no `name` key.
    #[error("config fragment has no `name` key")]
    MissingNameKey,

    /// A config fragment has no `type` key where one is required.
    #[error("config fragment has no `type` key")]
    MissingTypeKey,

    /// A `type` value names a plugin that was never registered.
    #[error("component {kind}::{type_name} does not exist")]
    ComponentDoesNotExist {
        kind: &'static str,
        type_name: String,
    },

    /// A plugin factory could not decode its config fragment.
    #[error("failed to decode {component} configuration: {message}")]
    ConfigDecode { component: String, message: String },

    /// The configuration document could not be loaded at all.
    #[error("failed to load configuration: {message}")]
    ConfigLoad { message: String },

    /// Unparseable log level string.
    #[error("log level `{level}` does not exist")]
    InvalidLogLevel { level: String },

    /// A certificate from the global config could not be used.
    #[error("certificate error: {message}")]
    Certificate { message: String },

    /// A source failed to materialize its resource.
    #[error("source '{source_name}' failed to download {what}: {message}")]
    SourceDownload {
        source_name: String,
        what: String,
        message: String,
    },

    /// Step-level failure that is not a plain command exit.
    #[error("step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// A spawned command exited non-zero (or was killed by a signal).
    #[error("command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// A spawned command overran its per-step deadline and was killed.
    #[error("command `{command}` timed out after {timeout_secs}s")]
    CommandTimeout { command: String, timeout_secs: u64 },

    /// Aggregate of every child failure from a group step's parallel
    /// download phase. Collected best-effort: all children run to
    /// completion before this is built.
    #[error("group '{group}' download failed: {}", join_failures(.failures))]
    GroupDownloadFailed {
        group: String,
        /// `(child step name, error text)` per failing child.
        failures: Vec<(String, String)>,
    },

    /// A referenced file does not exist.
    #[error("path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// HTTP error wrapper.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_failures(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{}: {}", name, err))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for rigup operations.
pub type Result<T> = std::result::Result<T, RigupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_does_not_exist_displays_kind_and_name() {
        let err = RigupError::ComponentDoesNotExist {
            kind: "step",
            type_name: "nonexistent".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("step::nonexistent"));
        assert!(msg.contains("does not exist"));
    }

    #[test]
    fn missing_keys_display_key_name() {
        assert!(RigupError::MissingNameKey.to_string().contains("`name`"));
        assert!(RigupError::MissingTypeKey.to_string().contains("`type`"));
    }

    #[test]
    fn group_download_failed_lists_every_child() {
        let err = RigupError::GroupDownloadFailed {
            group: "g".into(),
            failures: vec![
                ("a".into(), "connection refused".into()),
                ("c".into(), "404".into()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("group 'g'"));
        assert!(msg.contains("a: connection refused"));
        assert!(msg.contains("c: 404"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = RigupError::CommandFailed {
            command: "apt-get install".into(),
            code: Some(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("apt-get install"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn command_timeout_displays_deadline() {
        let err = RigupError::CommandTimeout {
            command: "sleep 60".into(),
            timeout_secs: 5,
        };
        assert!(err.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn source_download_displays_all_parts() {
        let err = RigupError::SourceDownload {
            source_name: "payload".into(),
            what: "https://example.com/x".into(),
            message: "status 500".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("payload"));
        assert!(msg.contains("https://example.com/x"));
        assert!(msg.contains("status 500"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: RigupError = io_err.into();
        assert!(matches!(err, RigupError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(RigupError::MissingTypeKey)
        }
        assert!(returns_error().is_err());
    }
}
