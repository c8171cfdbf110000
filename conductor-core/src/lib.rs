//! Conductor core library — task registry, dependency resolution, execution.
//!
//! - [`types`] — [`Task`], [`Action`], [`Completion`], [`TaskOptions`]
//! - [`registry`] — [`TaskRegistry`]
//! - [`resolver`] — [`plan`] / [`ExecutionPlan`]
//! - [`executor`] — [`run`] / [`run_blocking`]
//! - [`error`] — [`RunError`], [`RegisterError`]

pub mod error;
pub mod executor;
pub mod registry;
pub mod resolver;
pub mod types;

pub use error::{BoxError, RegisterError, RunError};
pub use executor::{run, run_blocking, RunSummary};
pub use registry::TaskRegistry;
pub use resolver::{plan, ExecutionPlan};
pub use types::{Action, ActionResult, Completion, Task, TaskOptions};
