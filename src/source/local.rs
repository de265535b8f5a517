//! Source plugin copying from the local filesystem.
//!
//! Copies a file or directory (relative paths resolve against the process
//! working directory) into the target directory. We copy rather than point
//! at the original so steps cannot mutate the source location.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::component::{Component, Fragment};
use crate::config::Resolver;
use crate::error::{Result, RigupError};
use crate::logger::SharedLogger;
use crate::source::Source;

const TYPE_NAME: &str = "local";

/// Local filesystem copy source.
pub struct LocalSource {
    name: String,
    path: PathBuf,
    logger: SharedLogger,
}

impl Component for LocalSource {
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

impl Source for LocalSource {
    fn download_to_path(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;

        let meta = std::fs::metadata(&self.path).map_err(|_| RigupError::PathNotFound {
            path: self.path.clone(),
        })?;

        if meta.is_dir() {
            copy_dir_recursive(&self.path, path)?;
        } else {
            let file_name = self
                .path
                .file_name()
                .ok_or_else(|| RigupError::PathNotFound {
                    path: self.path.clone(),
                })?;
            std::fs::copy(&self.path, path.join(file_name))?;
        }

        self.logger.debug(
            1,
            &format!(
                "source '{}': copied {} to {}",
                self.name,
                self.path.display(),
                path.display()
            ),
        );
        Ok(())
    }
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<()> {
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            std::fs::create_dir_all(&target)?;
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct LocalConfig {
    path: PathBuf,
}

/// Factory for the `local` source plugin.
pub fn loader(fragment: &Fragment, resolver: &Resolver<'_>) -> Result<Box<dyn Source>> {
    let config: LocalConfig =
        serde_json::from_value(serde_json::Value::Object(fragment.clone())).map_err(|e| {
            RigupError::ConfigDecode {
                component: format!("source.{TYPE_NAME}"),
                message: e.to_string(),
            }
        })?;
    Ok(Box::new(LocalSource {
        name: TYPE_NAME.to_string(),
        path: config.path,
        logger: resolver.logger(),
    }))
}
