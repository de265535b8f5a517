//! Resource-acquisition capability.
//!
//! A [`Source`] materializes its resource(s) into a caller-given directory.
//! Side-effect only: repeated calls may re-download or overwrite, and steps
//! own their sources exclusively.

pub mod http;
pub mod local;

use std::path::Path;

use crate::component::Component;
use crate::error::Result;

/// Materializes data into a directory.
///
/// `Send` because group steps download their children (and thus the
/// children's sources) from worker threads.
pub trait Source: Component + Send {
    /// Place this source's resource(s) under `path`, creating it if needed.
    fn download_to_path(&self, path: &Path) -> Result<()>;
}
