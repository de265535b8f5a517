//! Structured lifecycle events and log levels.
//!
//! An [`Event`] is an immutable record emitted at well-defined transition
//! points (step start/complete/failure, group download/execute phases, run
//! summary) and broadcast to every configured logger.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, RigupError};

/// Optional structured fields attached to an event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_secs: Option<u64>,
}

/// A structured lifecycle record consumed by all configured loggers.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Event code, e.g. `STEP_0_START` or `ALL_STEPS_COMPLETE`.
    pub event: String,
    /// The component that emitted the event.
    pub component: String,
    /// Human-readable message; failure events embed the error text here.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<EventFields>,
}

impl Event {
    /// Create an event with no structured fields.
    pub fn new(event: &str, component: &str, message: &str) -> Self {
        Self {
            event: event.to_string(),
            component: component.to_string(),
            message: message.to_string(),
            fields: None,
        }
    }

    /// Create an event carrying structured fields.
    pub fn with_fields(event: &str, component: &str, message: &str, fields: EventFields) -> Self {
        Self {
            fields: Some(fields),
            ..Self::new(event, component, message)
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EVENT: {} in {} - {}", self.event, self.component, self.message)
    }
}

/// Logger message levels, ordered so that a threshold of `Debug` admits
/// everything and `Error` admits only errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl LogLevel {
    pub(crate) fn from_u8(v: u8) -> LogLevel {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Info => 1,
            LogLevel::Debug => 2,
        }
    }
}

impl FromStr for LogLevel {
    type Err = RigupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(RigupError::InvalidLogLevel { level: s.into() }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(s)
    }
}

/// Whole seconds of a duration, as embedded in event fields.
pub fn elapsed_secs(duration: Duration) -> u64 {
    duration.as_secs()
}
