//! Error types for conductor-core.

use thiserror::Error;

/// Error type produced by task actions.
///
/// Actions may fail with anything that implements [`std::error::Error`]; the
/// executor wraps it in [`RunError::TaskFailed`] together with the task name.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while adding tasks to a [`TaskRegistry`](crate::TaskRegistry).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// Task names must be non-empty.
    #[error("task name must not be empty")]
    EmptyName,

    /// A task with this name is already registered. Registration never
    /// overwrites.
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),
}

/// All errors that can abort a [`run`](crate::run).
#[derive(Debug, Error)]
pub enum RunError {
    /// The requested task, or one of its dependencies, is not registered.
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    /// The dependency graph reachable from the requested task has a cycle.
    /// The path starts and ends with the same task name.
    #[error("cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    /// A task action returned an error or signalled failure.
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: BoxError,
    },

    /// A deferred task dropped its completion handle without signalling.
    #[error("task '{task}' finished without signalling completion")]
    CompletionDropped { task: String },

    /// The blocking entry point could not build its runtime.
    #[error("failed to start task runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl RunError {
    /// Name of the task that caused the error, when one is known.
    pub fn task(&self) -> Option<&str> {
        match self {
            RunError::UnknownTask(name) => Some(name.as_str()),
            RunError::TaskFailed { task, .. } | RunError::CompletionDropped { task } => {
                Some(task.as_str())
            }
            RunError::CyclicDependency(path) => path.first().map(String::as_str),
            RunError::Runtime(_) => None,
        }
    }
}
