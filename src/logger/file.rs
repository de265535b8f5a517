//! Logger plugin writing JSON lines to a file.
//!
//! Each message or event becomes one JSON object with an RFC 3339 timestamp.
//! The writer is buffered; `shutdown` flushes it.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::component::{Component, Fragment};
use crate::error::{Result, RigupError};
use crate::event::{Event, LogLevel};
use crate::logger::Logger;

const TYPE_NAME: &str = "file";

/// JSON-lines file sink.
pub struct FileLogger {
    name: String,
    level: AtomicU8,
    debug: AtomicI32,
    out: Mutex<BufWriter<File>>,
}

impl FileLogger {
    /// Open (append) the log file at `path`.
    pub fn open(name: &str, path: PathBuf, level: LogLevel, debug: i32) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            name: name.to_string(),
            level: AtomicU8::new(level.as_u8()),
            debug: AtomicI32::new(debug),
            out: Mutex::new(BufWriter::new(file)),
        })
    }

    fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    fn write_line(&self, value: serde_json::Value) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = serde_json::to_writer(&mut *out, &value) {
            tracing::warn!("file logger `{}` write failed: {e}", self.name);
            return;
        }
        if let Err(e) = out.write_all(b"\n") {
            tracing::warn!("file logger `{}` write failed: {e}", self.name);
        }
    }

    fn log(&self, level: LogLevel, msg: &str) {
        self.write_line(json!({
            "ts": Utc::now().to_rfc3339(),
            "level": level.to_string(),
            "logger": self.name,
            "message": msg,
        }));
    }
}

impl Component for FileLogger {
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

impl Logger for FileLogger {
    fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    fn set_debug(&self, debug: i32) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    fn info(&self, msg: &str) {
        if self.level() >= LogLevel::Info {
            self.log(LogLevel::Info, msg);
        }
    }

    fn debug(&self, debug: i32, msg: &str) {
        if self.level() >= LogLevel::Debug && debug <= self.debug.load(Ordering::Relaxed) {
            self.log(LogLevel::Debug, msg);
        }
    }

    fn write_event(&self, event: &Event) {
        self.write_line(json!({
            "ts": Utc::now().to_rfc3339(),
            "logger": self.name,
            "event": event,
        }));
    }

    fn shutdown(&self) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = out.flush() {
            tracing::warn!("file logger `{}` flush failed: {e}", self.name);
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    path: PathBuf,
    #[serde(default = "default_level")]
    level: String,
    #[serde(default)]
    debug: i32,
}

fn default_level() -> String {
    "info".to_string()
}

/// Factory for the `file` logger plugin.
pub fn loader(fragment: &Fragment) -> Result<Box<dyn Logger>> {
    let config: FileConfig =
        serde_json::from_value(serde_json::Value::Object(fragment.clone())).map_err(|e| {
            RigupError::ConfigDecode {
                component: TYPE_NAME.to_string(),
                message: e.to_string(),
            }
        })?;
    let level: LogLevel = config.level.parse()?;
    Ok(Box::new(FileLogger::open(
        TYPE_NAME,
        config.path,
        level,
        config.debug,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn fragment(v: serde_json::Value) -> Fragment {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn writes_json_lines_and_flushes_on_shutdown() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.log");
        let logger = loader(&fragment(json!({
            "name": "runlog",
            "type": "file",
            "path": path,
        })))
        .unwrap();

        logger.info("booting");
        logger.write_event(&Event::new("STEP_0_START", "rigup.engine", "go"));
        logger.shutdown();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let msg: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(msg["level"], "INFO");
        assert_eq!(msg["message"], "booting");
        assert!(msg["ts"].as_str().is_some());

        let ev: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(ev["event"]["event"], "STEP_0_START");
        assert_eq!(ev["event"]["component"], "rigup.engine");
    }

    #[test]
    fn level_threshold_filters_messages() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.log");
        let logger = loader(&fragment(json!({
            "name": "runlog",
            "type": "file",
            "path": path,
            "level": "error",
        })))
        .unwrap();

        logger.info("dropped");
        logger.debug(0, "dropped");
        logger.error("kept");
        logger.shutdown();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("kept"));
    }

    #[test]
    fn debug_verbosity_filters() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.log");
        let logger = loader(&fragment(json!({
            "name": "runlog",
            "type": "file",
            "path": path,
            "level": "debug",
            "debug": 1,
        })))
        .unwrap();

        logger.debug(1, "kept");
        logger.debug(2, "too detailed");
        logger.shutdown();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("kept"));
    }

    #[test]
    fn missing_path_is_decode_error() {
        let err = loader(&fragment(json!({"name": "runlog", "type": "file"})))
            .err()
            .unwrap();
        assert!(matches!(err, RigupError::ConfigDecode { .. }));
    }
}
