//! The unit of orchestration.
//!
//! A [`Step`] has a two-phase lifecycle: `download` acquires resources (and
//! must not mutate host state), then `execute` performs the host-affecting
//! action. The engine guarantees download is always attempted before execute
//! for a given step, and that execute never runs if download failed.

pub mod command;
pub mod group;
pub mod noop;

use crate::component::Component;
use crate::error::Result;

/// A unit of orchestration with a download-then-execute lifecycle.
///
/// `Send` because group steps run their children's download phase on worker
/// threads.
pub trait Step: Component + Send {
    /// Acquire any resources this step needs. Must not mutate host state.
    fn download(&mut self) -> Result<()>;

    /// Perform the step's host-affecting action.
    fn execute(&mut self) -> Result<()>;
}
