//! Logging capability and the fan-out broker.
//!
//! A [`Logger`] accepts leveled text messages and structured [`Event`]s.
//! [`MultiLogger`] is the central broker: it holds the ordered list of
//! configured sinks, implements [`Logger`] itself, and forwards every call to
//! every sink in list order. Forwarding is serial; a slow sink delays the
//! sinks after it and the caller.
//!
//! Level and debug thresholds on the broker are pass-through state only.
//! Filtering is each sink's own responsibility.

pub mod file;
pub mod stdlib;

use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};
use std::sync::Arc;

use crate::component::Component;
use crate::event::{Event, LogLevel};

/// Logging sink capability.
///
/// Loggers are shared across group-download worker threads, so every method
/// takes `&self`; implementations use interior mutability for their level
/// state and must tolerate concurrent calls.
pub trait Logger: Component + Send + Sync {
    /// Set the message level threshold.
    fn set_level(&self, level: LogLevel);

    /// Set the debug verbosity threshold (only `debug` calls at or below
    /// this value are emitted).
    fn set_debug(&self, debug: i32);

    /// Log a message at ERROR level.
    fn error(&self, msg: &str);

    /// Log a message at INFO level.
    fn info(&self, msg: &str);

    /// Log a message at DEBUG level with a verbosity value.
    fn debug(&self, debug: i32, msg: &str);

    /// Write a structured event to this logger.
    fn write_event(&self, event: &Event);

    /// Flush and release any held resources. Sinks log their own shutdown
    /// failures; the caller collects no error.
    fn shutdown(&self);
}

/// Shared handle to a logger, cloneable across threads.
pub type SharedLogger = Arc<dyn Logger>;

/// Fan-out broker over an ordered list of sinks.
pub struct MultiLogger {
    sinks: Vec<SharedLogger>,
    level: AtomicU8,
    debug: AtomicI32,
}

impl MultiLogger {
    /// Create a broker over the given sinks, in forwarding order.
    pub fn new(sinks: Vec<SharedLogger>) -> Self {
        Self {
            sinks,
            level: AtomicU8::new(LogLevel::Debug.as_u8()),
            debug: AtomicI32::new(i32::MAX),
        }
    }

    /// Number of attached sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// The broker's pass-through level threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// The broker's pass-through debug threshold.
    pub fn debug_threshold(&self) -> i32 {
        self.debug.load(Ordering::Relaxed)
    }
}

impl Component for MultiLogger {
    fn name(&self) -> &str {
        "multi"
    }

    // The broker is not addressable from configuration.
    fn set_name(&mut self, _name: &str) {}

    fn type_name(&self) -> &'static str {
        "multi"
    }
}

impl Logger for MultiLogger {
    fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    fn set_debug(&self, debug: i32) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    fn error(&self, msg: &str) {
        for sink in &self.sinks {
            sink.error(msg);
        }
    }

    fn info(&self, msg: &str) {
        for sink in &self.sinks {
            sink.info(msg);
        }
    }

    fn debug(&self, debug: i32, msg: &str) {
        for sink in &self.sinks {
            sink.debug(debug, msg);
        }
    }

    fn write_event(&self, event: &Event) {
        for sink in &self.sinks {
            sink.write_event(event);
        }
    }

    fn shutdown(&self) {
        for sink in &self.sinks {
            sink.shutdown();
        }
    }
}
