//! Write-once capability registries.
//!
//! Each plugin kind (config source, logger, source, step) has its own
//! independently-scoped namespace mapping a type-name string to a factory
//! function. Namespaces are populated during process start-up, before any
//! configuration is read; registering the same type name twice within one
//! namespace is a packaging defect and panics.
//!
//! Registries are plain values passed by reference into the resolver, so
//! tests can construct isolated instances instead of sharing process-wide
//! state.

use std::collections::HashMap;

use crate::component::Fragment;
use crate::config::source::{ConfigSource, ConfigSourceOptions};
use crate::config::Resolver;
use crate::error::{Result, RigupError};
use crate::logger::Logger;
use crate::source::Source;
use crate::step::Step;

/// Factory for configuration sources, constructed from CLI-provided options.
pub type ConfigSourceFactory = fn(&ConfigSourceOptions) -> Result<Box<dyn ConfigSource>>;

/// Factory for logger sinks, decoded from a config fragment.
pub type LoggerFactory = fn(&Fragment) -> Result<Box<dyn Logger>>;

/// Factory for sources; receives the resolver for access to the shared
/// logger, global config, and temp tracker.
pub type SourceFactory = fn(&Fragment, &Resolver<'_>) -> Result<Box<dyn Source>>;

/// Factory for steps; receives the resolver so composite steps can resolve
/// nested steps and embedded sources.
pub type StepFactory = fn(&Fragment, &Resolver<'_>) -> Result<Box<dyn Step>>;

/// One write-once, type-name-keyed namespace of factories.
#[derive(Debug)]
pub struct Registry<F> {
    kind: &'static str,
    entries: HashMap<String, F>,
}

impl<F> Registry<F> {
    /// Create an empty registry for one capability kind. The kind string
    /// appears in "component does not exist" errors.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Insert a factory under `type_name`.
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is already registered in this namespace.
    /// Registries are write-once; a duplicate means two plugins were
    /// packaged under the same key.
    pub fn register(&mut self, type_name: &str, factory: F) {
        if self.entries.contains_key(type_name) {
            panic!("{} plugin `{}` is already registered", self.kind, type_name);
        }
        self.entries.insert(type_name.to_string(), factory);
    }

    /// Look up the factory registered under `type_name`.
    pub fn get(&self, type_name: &str) -> Result<&F> {
        self.entries
            .get(type_name)
            .ok_or_else(|| RigupError::ComponentDoesNotExist {
                kind: self.kind,
                type_name: type_name.to_string(),
            })
    }

    /// Whether `type_name` is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }
}

/// The four capability namespaces, bundled for injection into the resolver.
#[derive(Debug)]
pub struct Registries {
    pub config_sources: Registry<ConfigSourceFactory>,
    pub loggers: Registry<LoggerFactory>,
    pub sources: Registry<SourceFactory>,
    pub steps: Registry<StepFactory>,
}

impl Registries {
    /// Create four empty namespaces.
    pub fn new() -> Self {
        Self {
            config_sources: Registry::new("config_source"),
            loggers: Registry::new("logger"),
            sources: Registry::new("source"),
            steps: Registry::new("step"),
        }
    }

    /// Empty registries with every built-in plugin registered.
    pub fn with_builtin_plugins() -> Self {
        let mut registries = Self::new();
        register_builtin_plugins(&mut registries);
        registries
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

/// Register every built-in plugin.
///
/// This is the explicit bootstrap: it must run before any configuration is
/// read so that every `type` value in the document can be resolved.
pub fn register_builtin_plugins(registries: &mut Registries) {
    registries
        .config_sources
        .register("local", crate::config::source::local_loader);
    registries
        .config_sources
        .register("embedded", crate::config::source::embedded_loader);

    registries
        .loggers
        .register("stdlib", crate::logger::stdlib::loader);
    registries
        .loggers
        .register("file", crate::logger::file::loader);

    registries
        .sources
        .register("local", crate::source::local::loader);
    registries
        .sources
        .register("http", crate::source::http::loader);

    registries
        .steps
        .register("command", crate::step::command::loader);
    registries.steps.register("group", crate::step::group::loader);
    registries.steps.register("noop", crate::step::noop::loader);
}
