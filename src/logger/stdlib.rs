//! Logger plugin that writes through the process `tracing` subscriber.
//!
//! This is the default sink and also serves as the early logger used before
//! the configuration document is available.

use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};

use serde::Deserialize;

use crate::component::{Component, Fragment};
use crate::error::{Result, RigupError};
use crate::event::{Event, LogLevel};
use crate::logger::Logger;

const TYPE_NAME: &str = "stdlib";

/// Logger that emits through `tracing` macros, filtering by its own level
/// and debug thresholds.
pub struct StdlibLogger {
    name: String,
    level: AtomicU8,
    debug: AtomicI32,
}

impl StdlibLogger {
    /// Create a logger with explicit thresholds. Used directly for the
    /// early logger; configured instances come from [`loader`].
    pub fn new(name: &str, level: LogLevel, debug: i32) -> Self {
        Self {
            name: name.to_string(),
            level: AtomicU8::new(level.as_u8()),
            debug: AtomicI32::new(debug),
        }
    }

    fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }
}

impl Component for StdlibLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }
}

impl Logger for StdlibLogger {
    fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    fn set_debug(&self, debug: i32) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    fn error(&self, msg: &str) {
        tracing::error!(logger = %self.name, "{msg}");
    }

    fn info(&self, msg: &str) {
        if self.level() >= LogLevel::Info {
            tracing::info!(logger = %self.name, "{msg}");
        }
    }

    fn debug(&self, debug: i32, msg: &str) {
        if self.level() >= LogLevel::Debug && debug <= self.debug.load(Ordering::Relaxed) {
            tracing::debug!(logger = %self.name, "{msg}");
        }
    }

    fn write_event(&self, event: &Event) {
        if self.level() >= LogLevel::Info {
            tracing::info!(logger = %self.name, "{event}");
        }
    }

    fn shutdown(&self) {}
}

#[derive(Debug, Deserialize)]
struct StdlibConfig {
    #[serde(default = "default_level")]
    level: String,
    #[serde(default)]
    debug: i32,
}

fn default_level() -> String {
    "info".to_string()
}

/// Factory for the `stdlib` logger plugin.
pub fn loader(fragment: &Fragment) -> Result<Box<dyn Logger>> {
    let config: StdlibConfig =
        serde_json::from_value(serde_json::Value::Object(fragment.clone())).map_err(|e| {
            RigupError::ConfigDecode {
                component: TYPE_NAME.to_string(),
                message: e.to_string(),
            }
        })?;
    let level: LogLevel = config.level.parse()?;
    Ok(Box::new(StdlibLogger::new(TYPE_NAME, level, config.debug)))
}
