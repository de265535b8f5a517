//! Step plugin running an external command.
//!
//! The command is an argv vector, run with a cleared environment plus the
//! configured `env` entries and any system variables whose names match a
//! `passthrough_env` prefix. When the step has a source, download places it
//! in a private temp directory and execute runs from there. An optional
//! `timeout_seconds` bounds the command; on expiry the child process is
//! killed before the step reports failure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::component::{Component, Fragment};
use crate::config::Resolver;
use crate::error::{Result, RigupError};
use crate::logger::SharedLogger;
use crate::source::Source;
use crate::step::Step;
use crate::temp::TempTracker;

const TYPE_NAME: &str = "command";

/// External command step.
pub struct CommandStep {
    name: String,
    command: Vec<String>,
    env: HashMap<String, String>,
    passthrough_env: Vec<String>,
    timeout_seconds: u64,
    source: Option<Box<dyn Source>>,
    logger: SharedLogger,
    temp: Arc<TempTracker>,
    download_path: Option<PathBuf>,
}

impl Component for CommandStep {
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

impl Step for CommandStep {
    fn download(&mut self) -> Result<()> {
        let Some(ref source) = self.source else {
            return Ok(());
        };
        self.logger
            .debug(1, &format!("step '{}': downloading source", self.name));
        let dir = self.temp.dir("rigup-command-")?;
        source.download_to_path(&dir)?;
        self.logger.debug(
            1,
            &format!("step '{}': downloaded source to {}", self.name, dir.display()),
        );
        self.download_path = Some(dir);
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        let Some(program) = self.command.first() else {
            return Err(RigupError::StepFailed {
                step: self.name.clone(),
                message: "empty command specification".to_string(),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(&self.command[1..]);
        cmd.env_clear();
        for prefix in &self.passthrough_env {
            for (key, value) in std::env::vars() {
                if key.starts_with(prefix.as_str()) {
                    cmd.env(key, value);
                }
            }
        }
        cmd.envs(&self.env);
        if let Some(ref dir) = self.download_path {
            cmd.current_dir(dir);
        }

        let display = self.command.join(" ");
        run_with_deadline(&mut cmd, &display, self.timeout_seconds)
    }
}

/// Run `cmd`, enforcing `timeout_secs` (0 = unbounded). The child is killed
/// and reaped before a timeout error is returned.
fn run_with_deadline(cmd: &mut Command, display: &str, timeout_secs: u64) -> Result<()> {
    if timeout_secs == 0 {
        let status = cmd.status()?;
        return check_status(status, display);
    }

    let mut child = cmd.spawn()?;
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    loop {
        if let Some(status) = child.try_wait()? {
            return check_status(status, display);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            child.wait()?;
            return Err(RigupError::CommandTimeout {
                command: display.to_string(),
                timeout_secs,
            });
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn check_status(status: ExitStatus, display: &str) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(RigupError::CommandFailed {
            command: display.to_string(),
            code: status.code(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct CommandConfig {
    #[serde(default)]
    command: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    passthrough_env: Vec<String>,
    #[serde(default)]
    timeout_seconds: u64,
}

/// Factory for the `command` step plugin.
pub fn loader(fragment: &Fragment, resolver: &Resolver<'_>) -> Result<Box<dyn Step>> {
    let source = resolver.source_from_step_fragment(fragment)?;
    let config: CommandConfig =
        serde_json::from_value(serde_json::Value::Object(fragment.clone())).map_err(|e| {
            RigupError::ConfigDecode {
                component: format!("step.{TYPE_NAME}"),
                message: e.to_string(),
            }
        })?;
    Ok(Box::new(CommandStep {
        name: TYPE_NAME.to_string(),
        command: config.command,
        env: config.env,
        passthrough_env: config.passthrough_env,
        timeout_seconds: config.timeout_seconds,
        source,
        logger: resolver.logger(),
        temp: resolver.temp(),
        download_path: None,
    }))
}
