//! Plugin-driven host bootstrap orchestrator.
//!
//! A run fetches one untyped JSON configuration document, resolves it into a
//! typed graph of loggers and steps, and executes the steps in order. Every
//! moving part behind the core loop is a plugin looked up by its `type`
//! string in a registry:
//!
//! - [`config`] fetches and resolves the configuration document
//! - [`logger`] sinks receive messages and lifecycle [`event`]s through a
//!   fan-out broker
//! - [`source`] plugins download artifacts a step needs
//! - [`step`] plugins do the actual work, driven by the [`engine`]
//!
//! [`registry`] holds the factory tables, [`cli`] wires a full run together,
//! and [`temp`] tracks the download directories steps create so they can be
//! cleaned up (or preserved) at the end.

pub mod cli;
pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod logger;
pub mod registry;
pub mod source;
pub mod step;
pub mod temp;

pub use error::{Result, RigupError};
