//! Command-line entry point wiring.
//!
//! Builds the plugin registries, stands up an early logger so output exists
//! before configuration is read, fetches and resolves the configuration
//! document, and hands the resolved step list to the engine. Temporary
//! directories are cleaned up whether the run succeeds or fails, unless
//! `--preserve-temp` asks to keep them for inspection.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::config::{self, ConfigSourceOptions};
use crate::engine::Engine;
use crate::error::Result;
use crate::event::{Event, LogLevel};
use crate::logger::stdlib::StdlibLogger;
use crate::logger::{Logger, SharedLogger};
use crate::registry::Registries;
use crate::temp::TempTracker;

/// Bootstrap orchestrator: fetch a configuration and run its steps.
#[derive(Debug, Parser)]
#[command(name = "rigup", version, about = "Run a configured sequence of bootstrap steps")]
pub struct Cli {
    /// Config source plugin to fetch the configuration document with.
    #[arg(short = 'C', long, default_value = "local")]
    pub config_source: String,

    /// Path handed to the config source (the document file for `local`).
    #[arg(short, long, env = "RIGUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level for the early logger: error, info, or debug.
    #[arg(short = 'l', long, default_value = "info", env = "RIGUP_LOG_LEVEL")]
    pub log_level: String,

    /// Debug verbosity for the early logger.
    #[arg(long, default_value_t = 0)]
    pub debug_level: i32,

    /// Keep temporary download directories after the run.
    #[arg(long)]
    pub preserve_temp: bool,
}

/// Run one bootstrap cycle from the parsed arguments.
pub fn run(cli: &Cli) -> Result<()> {
    let registries = Registries::with_builtin_plugins();

    let level: LogLevel = cli.log_level.parse()?;
    let early: SharedLogger = Arc::new(StdlibLogger::new("rigup", level, cli.debug_level));
    early.debug(
        1,
        &format!("fetching configuration via `{}`", cli.config_source),
    );

    let source_factory = registries.config_sources.get(&cli.config_source)?;
    let source = source_factory(&ConfigSourceOptions {
        path: cli.config.clone(),
        document: None,
    })?;
    let document = source.read_config()?;

    let temp = Arc::new(TempTracker::new());
    let resolved = config::resolve(&document, &registries, Some(early), Arc::clone(&temp));

    let result = match resolved {
        Ok(mut resolved) => {
            resolved.logger.write_event(&Event::new(
                "LOGGING_INITIALIZED",
                "rigup.cli",
                &format!("{} configured sink(s)", resolved.logger.sink_count()),
            ));
            let engine = Engine::new(resolved.logger.clone());
            let outcome = engine.run(&mut resolved.steps).map(|summary| {
                resolved.logger.info(&format!(
                    "run complete: {} step(s) in {}s",
                    summary.steps_run,
                    summary.elapsed.as_secs()
                ));
            });
            resolved.logger.shutdown();
            outcome
        }
        Err(e) => Err(e),
    };

    temp.cleanup(cli.preserve_temp);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    fn cli_for(config: Option<PathBuf>) -> Cli {
        Cli {
            config_source: "local".to_string(),
            config,
            log_level: "error".to_string(),
            debug_level: 0,
            preserve_temp: false,
        }
    }

    #[test]
    fn runs_a_local_config_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rigup.json");
        std::fs::write(
            &path,
            r#"{"steps": [{"name": "placeholder", "type": "noop"}]}"#,
        )
        .unwrap();

        run(&cli_for(Some(path))).unwrap();
    }

    #[test]
    fn missing_config_path_is_an_error() {
        let err = run(&cli_for(None)).unwrap_err();
        assert!(matches!(err, crate::error::RigupError::ConfigLoad { .. }));
    }

    #[test]
    fn unknown_config_source_is_an_error() {
        let mut cli = cli_for(None);
        cli.config_source = "carrier-pigeon".to_string();
        let err = run(&cli).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RigupError::ComponentDoesNotExist {
                kind: "config_source",
                ..
            }
        ));
    }

    #[test]
    fn invalid_log_level_is_an_error() {
        let mut cli = cli_for(None);
        cli.log_level = "loud".to_string();
        let err = run(&cli).unwrap_err();
        assert!(matches!(
            err,
            crate::error::RigupError::InvalidLogLevel { .. }
        ));
    }
}
