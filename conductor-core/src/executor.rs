//! Plan execution.
//!
//! ## `run` — protocol
//!
//! 1. Resolve the plan (fails before any action runs).
//! 2. Execute tasks strictly in plan order; only the requested task receives
//!    the caller's arguments.
//! 3. A deferred task holds the plan until its [`Completion`] fires.
//! 4. The first failure stops the plan; completed tasks are not rolled back.
//!
//! There is no timeout: a deferred task that keeps its completion alive
//! without signalling suspends the run indefinitely.

use std::time::{Duration, Instant};

use crate::error::RunError;
use crate::registry::TaskRegistry;
use crate::resolver::plan;
use crate::types::{Action, ActionResult, Completion, Task};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub target: String,
    /// Task names in the order their actions ran.
    pub executed: Vec<String>,
    pub duration: Duration,
}

/// Run `name` and its transitive dependencies.
pub async fn run(
    registry: &TaskRegistry,
    name: &str,
    args: &[String],
) -> Result<RunSummary, RunError> {
    let started = Instant::now();
    let plan = plan(registry, name)?;
    let mut executed = Vec::with_capacity(plan.len());

    for task_name in plan {
        let task = registry
            .get(&task_name)
            .ok_or_else(|| RunError::UnknownTask(task_name.clone()))?;
        let task_args: &[String] = if task_name == name { args } else { &[] };

        tracing::debug!(task = %task_name, args = ?task_args, "starting task");
        let task_started = Instant::now();
        if let Err(source) = invoke(task, task_args).await? {
            tracing::error!(task = %task_name, error = %source, "task failed");
            return Err(RunError::TaskFailed {
                task: task_name,
                source,
            });
        }
        tracing::debug!(
            task = %task_name,
            elapsed_ms = task_started.elapsed().as_millis() as u64,
            "finished task"
        );
        executed.push(task_name);
    }

    Ok(RunSummary {
        target: name.to_string(),
        executed,
        duration: started.elapsed(),
    })
}

/// Run on a fresh current-thread runtime and block until the run ends.
///
/// Must not be called from inside another tokio runtime.
pub fn run_blocking(
    registry: &TaskRegistry,
    name: &str,
    args: &[String],
) -> Result<RunSummary, RunError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(registry, name, args))
}

/// Invoke one action. The outer `Result` carries executor-level errors, the
/// inner one the action's own outcome.
async fn invoke(task: &Task, args: &[String]) -> Result<ActionResult, RunError> {
    match &task.action {
        Action::Sync(f) => Ok(f(args)),
        Action::Deferred(f) => {
            let (done, signal) = Completion::channel();
            if let Err(e) = f(args, done) {
                return Ok(Err(e));
            }
            signal.await.map_err(|_| RunError::CompletionDropped {
                task: task.name.clone(),
            })
        }
    }
}
