//! Composite step: an ordered sequence of child steps.
//!
//! Acquisition (network/disk I/O) parallelizes safely, so download fans out
//! one worker thread per child, waits for all of them regardless of
//! individual failures, and reports every failing child in one aggregate
//! error. Execution mutates the host in order-dependent ways, so it runs
//! children strictly sequentially and stops at the first failure.
//!
//! Groups are steps themselves, so they nest.

use std::sync::mpsc;

use crate::component::{Component, Fragment};
use crate::config::Resolver;
use crate::error::{Result, RigupError};
use crate::event::Event;
use crate::logger::SharedLogger;
use crate::step::Step;

const TYPE_NAME: &str = "group";

/// A step that owns an ordered sequence of child steps.
pub struct StepGroup {
    name: String,
    steps: Vec<Box<dyn Step>>,
    logger: SharedLogger,
}

impl StepGroup {
    /// Build a group directly. Configuration-driven groups come from
    /// [`loader`].
    pub fn new(name: &str, steps: Vec<Box<dyn Step>>, logger: SharedLogger) -> Self {
        Self {
            name: name.to_string(),
            steps,
            logger,
        }
    }

    /// Number of child steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the group has no children.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn event(&self, code: &str) {
        self.logger
            .write_event(&Event::new(code, TYPE_NAME, &self.name));
    }
}

impl Component for StepGroup {
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

impl Step for StepGroup {
    /// Download every child concurrently, joining all of them before
    /// returning. Failures do not cancel siblings; every child error is
    /// collected and reported in the aggregate.
    fn download(&mut self) -> Result<()> {
        self.event("GROUP_DOWNLOAD_START");

        let (tx, rx) = mpsc::sync_channel(self.steps.len());
        let logger = &self.logger;
        std::thread::scope(|scope| {
            for step in self.steps.iter_mut() {
                let tx = tx.clone();
                scope.spawn(move || {
                    if let Err(e) = step.download() {
                        // Channel capacity equals the child count, so this
                        // never blocks.
                        let _ = tx.send((step.name().to_string(), e.to_string()));
                    }
                });
            }
        });
        drop(tx);

        let failures: Vec<(String, String)> = rx.iter().collect();
        for (child, error) in &failures {
            logger.error(&format!(
                "group '{}': step '{}' download failed: {}",
                self.name, child, error
            ));
        }

        if failures.is_empty() {
            self.event("GROUP_DOWNLOAD_COMPLETE");
            Ok(())
        } else {
            self.event("GROUP_DOWNLOAD_FAILURE");
            Err(RigupError::GroupDownloadFailed {
                group: self.name.clone(),
                failures,
            })
        }
    }

    /// Execute children sequentially in declared order, stopping at the
    /// first failure and returning that child's error unchanged.
    fn execute(&mut self) -> Result<()> {
        self.event("GROUP_EXECUTE_START");
        for step in self.steps.iter_mut() {
            if let Err(e) = step.execute() {
                self.event("GROUP_EXECUTE_FAILURE");
                return Err(e);
            }
        }
        self.event("GROUP_EXECUTE_COMPLETE");
        Ok(())
    }
}

/// Factory for the `group` step plugin. Re-enters step extraction for the
/// fragment's nested `steps` list.
pub fn loader(fragment: &Fragment, resolver: &Resolver<'_>) -> Result<Box<dyn Step>> {
    let steps = resolver.steps(fragment)?;
    Ok(Box::new(StepGroup::new(
        TYPE_NAME,
        steps,
        resolver.logger(),
    )))
}
