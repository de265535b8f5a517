//! Configuration resolution: untyped document in, typed object graph out.
//!
//! [`resolve`] turns one untyped JSON document into a [`Config`]: the global
//! settings are applied first, then the ordered logger list is built and
//! wrapped in the fan-out broker, then the step tree is built with that
//! broker already live. Step factories resolve their own embedded `source`
//! fragments, and the group step factory recursively re-enters step
//! extraction for its children.
//!
//! Resolution is all-or-nothing: the first missing key, unknown type, or
//! factory decode error aborts the whole resolve.

pub mod global;
pub mod source;

use std::sync::Arc;

use serde_json::Value;

use crate::component::{fragment_name_type, fragment_type, Fragment};
use crate::error::{Result, RigupError};
use crate::logger::{Logger, MultiLogger, SharedLogger};
use crate::registry::Registries;
use crate::source::Source;
use crate::step::Step;
use crate::temp::TempTracker;

pub use global::{GlobalConfig, GlobalProcessors};
pub use source::{ConfigSource, ConfigSourceOptions};

/// The fully resolved run unit: created once per run, immutable thereafter.
pub struct Config {
    /// Fan-out broker over the resolved logger list (early logger first,
    /// then configured sinks in document order).
    pub logger: Arc<MultiLogger>,
    /// Top-level steps in document order.
    pub steps: Vec<Box<dyn Step>>,
    /// Shared global settings.
    pub global: Arc<GlobalConfig>,
}

/// Resolution context handed to source and step factories: the registries
/// plus the shared logger, global config, and temp tracker that resolved
/// components capture.
pub struct Resolver<'a> {
    registries: &'a Registries,
    logger: SharedLogger,
    global: Arc<GlobalConfig>,
    temp: Arc<TempTracker>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registries: &'a Registries,
        logger: SharedLogger,
        global: Arc<GlobalConfig>,
        temp: Arc<TempTracker>,
    ) -> Self {
        Self {
            registries,
            logger,
            global,
            temp,
        }
    }

    /// A clone of the shared logger handle for a resolved component.
    pub fn logger(&self) -> SharedLogger {
        Arc::clone(&self.logger)
    }

    /// The shared global settings.
    pub fn global(&self) -> Arc<GlobalConfig> {
        Arc::clone(&self.global)
    }

    /// The shared temporary-directory tracker.
    pub fn temp(&self) -> Arc<TempTracker> {
        Arc::clone(&self.temp)
    }

    /// Build the ordered step list from a container's `steps` key. Used for
    /// the top-level document and, recursively, for group step fragments.
    /// A container without a `steps` key resolves to zero steps.
    pub fn steps(&self, container: &Fragment) -> Result<Vec<Box<dyn Step>>> {
        let list = match container.get("steps") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(list)) => list,
            Some(_) => {
                return Err(RigupError::ConfigLoad {
                    message: "`steps` must be a list of objects".to_string(),
                })
            }
        };

        let mut steps: Vec<Box<dyn Step>> = Vec::with_capacity(list.len());
        for entry in list {
            let fragment = entry.as_object().ok_or_else(|| RigupError::ConfigLoad {
                message: "`steps` entries must be objects".to_string(),
            })?;
            let (name, type_name) = fragment_name_type(fragment)?;
            self.logger
                .debug(1, &format!("resolving step '{name}' of type `{type_name}`"));
            let factory = self.registries.steps.get(type_name)?;
            let mut step = factory(fragment, self)?;
            step.set_name(name);
            steps.push(step);
        }
        Ok(steps)
    }

    /// Resolve a step fragment's optional `source` sub-object. Absent,
    /// null, or empty objects mean "no source". The nested fragment needs a
    /// `type` key only; `name` defaults to the plugin's type name.
    pub fn source_from_step_fragment(
        &self,
        fragment: &Fragment,
    ) -> Result<Option<Box<dyn Source>>> {
        let source_fragment = match fragment.get("source") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(map)) if map.is_empty() => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(RigupError::ConfigLoad {
                    message: "`source` must be an object".to_string(),
                })
            }
        };
        let type_name = fragment_type(source_fragment)?;
        let factory = self.registries.sources.get(type_name)?;
        let mut source = factory(source_fragment, self)?;
        if let Some(name) = source_fragment.get("name").and_then(Value::as_str) {
            source.set_name(name);
        }
        Ok(Some(source))
    }
}

/// Resolve an untyped configuration document into a [`Config`].
///
/// An `early_logger` used before configuration was available is prepended to
/// the resolved logger list so no bootstrap output is lost.
pub fn resolve(
    document: &Value,
    registries: &Registries,
    early_logger: Option<SharedLogger>,
    temp: Arc<TempTracker>,
) -> Result<Config> {
    let doc = document.as_object().ok_or_else(|| RigupError::ConfigLoad {
        message: "configuration document is not an object".to_string(),
    })?;

    let mut global = GlobalConfig::default();
    GlobalProcessors::builtin().process(document, &mut global)?;
    let global = Arc::new(global);

    let mut sinks = resolve_loggers(doc, registries)?;
    if let Some(early) = early_logger {
        sinks.insert(0, early);
    }
    let broker = Arc::new(MultiLogger::new(sinks));

    let resolver = Resolver::new(
        registries,
        broker.clone() as SharedLogger,
        Arc::clone(&global),
        temp,
    );
    let steps = resolver.steps(doc)?;

    Ok(Config {
        logger: broker,
        steps,
        global,
    })
}

/// Build the ordered logger list from the document's `loggers` key. Every
/// fragment must carry both `name` and `type`.
fn resolve_loggers(doc: &Fragment, registries: &Registries) -> Result<Vec<SharedLogger>> {
    let list = match doc.get("loggers") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(list)) => list,
        Some(_) => {
            return Err(RigupError::ConfigLoad {
                message: "`loggers` must be a list of objects".to_string(),
            })
        }
    };

    let mut sinks: Vec<SharedLogger> = Vec::with_capacity(list.len());
    for entry in list {
        let fragment = entry.as_object().ok_or_else(|| RigupError::ConfigLoad {
            message: "`loggers` entries must be objects".to_string(),
        })?;
        let (name, type_name) = fragment_name_type(fragment)?;
        let factory = registries.loggers.get(type_name)?;
        let mut logger: Box<dyn Logger> = factory(fragment)?;
        logger.set_name(name);
        sinks.push(Arc::from(logger));
    }
    Ok(sinks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LogLevel;
    use crate::logger::stdlib::StdlibLogger;
    use serde_json::json;

    fn resolve_doc(document: Value) -> Result<Config> {
        let registries = Registries::with_builtin_plugins();
        resolve(
            &document,
            &registries,
            None,
            Arc::new(TempTracker::new()),
        )
    }

    #[test]
    fn empty_document_resolves_to_nothing() {
        let config = resolve_doc(json!({})).unwrap();
        assert_eq!(config.steps.len(), 0);
        assert_eq!(config.logger.sink_count(), 0);
    }

    #[test]
    fn loggers_and_steps_resolve_in_order() {
        let config = resolve_doc(json!({
            "loggers": [
                {"name": "console", "type": "stdlib"}
            ],
            "steps": [
                {"name": "first", "type": "noop"},
                {"name": "second", "type": "noop"}
            ]
        }))
        .unwrap();
        assert_eq!(config.logger.sink_count(), 1);
        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[0].name(), "first");
        assert_eq!(config.steps[1].name(), "second");
    }

    #[test]
    fn early_logger_is_prepended() {
        let registries = Registries::with_builtin_plugins();
        let early: SharedLogger = Arc::new(StdlibLogger::new("early", LogLevel::Info, 0));
        let config = resolve(
            &json!({"loggers": [{"name": "console", "type": "stdlib"}]}),
            &registries,
            Some(early),
            Arc::new(TempTracker::new()),
        )
        .unwrap();
        assert_eq!(config.logger.sink_count(), 2);
    }

    #[test]
    fn logger_without_name_aborts_resolution() {
        let err = resolve_doc(json!({"loggers": [{"type": "stdlib"}]})).err().unwrap();
        assert!(matches!(err, RigupError::MissingNameKey));
    }

    #[test]
    fn step_without_type_aborts_resolution() {
        let err = resolve_doc(json!({"steps": [{"name": "x"}]})).err().unwrap();
        assert!(matches!(err, RigupError::MissingTypeKey));
    }

    #[test]
    fn unregistered_step_type_aborts_resolution() {
        let err = resolve_doc(json!({"steps": [{"name": "x", "type": "teleport"}]}))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RigupError::ComponentDoesNotExist { kind: "step", .. }
        ));
    }

    #[test]
    fn nested_group_steps_resolve_recursively() {
        let config = resolve_doc(json!({
            "steps": [
                {"name": "g", "type": "group", "steps": [
                    {"name": "inner", "type": "noop"},
                    {"name": "gg", "type": "group", "steps": [
                        {"name": "leaf", "type": "noop"}
                    ]}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(config.steps.len(), 1);
        assert_eq!(config.steps[0].name(), "g");
    }

    #[test]
    fn nested_step_error_aborts_whole_resolution() {
        let err = resolve_doc(json!({
            "steps": [
                {"name": "g", "type": "group", "steps": [
                    {"name": "inner", "type": "missing-plugin"}
                ]}
            ]
        }))
        .err()
        .unwrap();
        assert!(matches!(err, RigupError::ComponentDoesNotExist { .. }));
    }

    fn test_resolver<'a>(registries: &'a Registries) -> Resolver<'a> {
        Resolver::new(
            registries,
            Arc::new(StdlibLogger::new("test", LogLevel::Error, 0)),
            Arc::new(GlobalConfig::default()),
            Arc::new(TempTracker::new()),
        )
    }

    #[test]
    fn absent_source_resolves_to_none() {
        let registries = Registries::with_builtin_plugins();
        let resolver = test_resolver(&registries);
        let fragment = json!({"name": "x", "type": "command"});
        let source = resolver
            .source_from_step_fragment(fragment.as_object().unwrap())
            .unwrap();
        assert!(source.is_none());
    }

    #[test]
    fn empty_source_object_resolves_to_none() {
        let registries = Registries::with_builtin_plugins();
        let resolver = test_resolver(&registries);
        let fragment = json!({"name": "x", "type": "command", "source": {}});
        let source = resolver
            .source_from_step_fragment(fragment.as_object().unwrap())
            .unwrap();
        assert!(source.is_none());
    }

    #[test]
    fn source_fragment_needs_type_but_not_name() {
        let registries = Registries::with_builtin_plugins();
        let resolver = test_resolver(&registries);

        let no_type = json!({"name": "x", "type": "command", "source": {"path": "/tmp"}});
        assert!(matches!(
            resolver.source_from_step_fragment(no_type.as_object().unwrap()),
            Err(RigupError::MissingTypeKey)
        ));

        let no_name = json!({"name": "x", "type": "command",
            "source": {"type": "local", "path": "/tmp"}});
        let source = resolver
            .source_from_step_fragment(no_name.as_object().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(source.name(), "local");
    }
}
