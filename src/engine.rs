//! Sequential step engine.
//!
//! Runs the resolved top-level step list in order. Each step goes through
//! download then execute, with lifecycle events broadcast at every
//! transition. The first failure aborts the run: the failing step's execute
//! never runs after a download failure, and no later step is touched.

use std::time::{Duration, Instant};

use crate::error::{Result, RigupError};
use crate::event::{elapsed_secs, Event, EventFields};
use crate::logger::SharedLogger;
use crate::step::Step;

const COMPONENT: &str = "rigup.engine";

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Steps that completed both phases.
    pub steps_run: usize,
    /// Wall-clock time across the whole run.
    pub elapsed: Duration,
}

/// Drives the resolved step list to completion.
pub struct Engine {
    logger: SharedLogger,
}

impl Engine {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }

    /// Run every step in order, aborting on the first failure.
    ///
    /// Event sequence for a successful run of N steps is
    /// `STEP_0_START .. STEP_0_COMPLETE .. STEP_{N-1}_COMPLETE`
    /// followed by `ALL_STEPS_COMPLETE`: 2N + 1 events.
    pub fn run(&self, steps: &mut [Box<dyn Step>]) -> Result<RunSummary> {
        let run_started = Instant::now();

        for (i, step) in steps.iter_mut().enumerate() {
            let label = format!("{}:'{}'", step.type_name(), step.name());
            let fields = EventFields {
                step_name: Some(step.name().to_string()),
                step_type: Some(step.type_name().to_string()),
                ..Default::default()
            };
            let step_started = Instant::now();

            self.logger.write_event(&Event::with_fields(
                &format!("STEP_{i}_START"),
                COMPONENT,
                &label,
                fields.clone(),
            ));

            if let Err(e) = self.run_step(step.as_mut()) {
                self.logger.write_event(&Event::with_fields(
                    &format!("STEP_{i}_FAILURE"),
                    COMPONENT,
                    &format!("{label}: {e}"),
                    EventFields {
                        elapsed_secs: Some(elapsed_secs(step_started.elapsed())),
                        ..fields
                    },
                ));
                return Err(e);
            }

            self.logger.write_event(&Event::with_fields(
                &format!("STEP_{i}_COMPLETE"),
                COMPONENT,
                &label,
                EventFields {
                    elapsed_secs: Some(elapsed_secs(step_started.elapsed())),
                    ..fields
                },
            ));
        }

        let elapsed = run_started.elapsed();
        self.logger.write_event(&Event::with_fields(
            "ALL_STEPS_COMPLETE",
            COMPONENT,
            &format!("{} steps completed", steps.len()),
            EventFields {
                step_count: Some(steps.len()),
                elapsed_secs: Some(elapsed_secs(elapsed)),
                ..Default::default()
            },
        ));

        Ok(RunSummary {
            steps_run: steps.len(),
            elapsed,
        })
    }

    fn run_step(&self, step: &mut dyn Step) -> Result<()> {
        self.logger
            .debug(1, &format!("step '{}': download phase", step.name()));
        step.download().map_err(|e| wrap(step, "download", e))?;
        self.logger
            .debug(1, &format!("step '{}': execute phase", step.name()));
        step.execute().map_err(|e| wrap(step, "execute", e))
    }
}

fn wrap(step: &dyn Step, phase: &str, e: RigupError) -> RigupError {
    RigupError::StepFailed {
        step: step.name().to_string(),
        message: format!("{phase} failed: {e}"),
    }
}
