//! Step plugin that does nothing.
//!
//! Useful as a placeholder while writing configurations and as the minimal
//! plugin example; tests lean on it for pure resolution checks.

use crate::component::{Component, Fragment};
use crate::config::Resolver;
use crate::error::Result;
use crate::logger::SharedLogger;
use crate::step::Step;

const TYPE_NAME: &str = "noop";

pub struct NoopStep {
    name: String,
    logger: SharedLogger,
}

impl Component for NoopStep {
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

impl Step for NoopStep {
    fn download(&mut self) -> Result<()> {
        self.logger.debug(1, &format!("noop '{}': download", self.name));
        Ok(())
    }

    fn execute(&mut self) -> Result<()> {
        self.logger.debug(1, &format!("noop '{}': execute", self.name));
        Ok(())
    }
}

/// Factory for the `noop` step plugin.
pub fn loader(_fragment: &Fragment, resolver: &Resolver<'_>) -> Result<Box<dyn Step>> {
    Ok(Box::new(NoopStep {
        name: TYPE_NAME.to_string(),
        logger: resolver.logger(),
    }))
}
