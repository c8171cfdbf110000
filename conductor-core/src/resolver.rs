//! Dependency resolution.
//!
//! [`plan`] walks the dependency edges depth-first from the requested task and
//! records each task after all of its dependencies (post-order). A name met
//! again while it is still on the walk stack closes a cycle.

use std::collections::HashSet;

use crate::error::RunError;
use crate::registry::TaskRegistry;

/// Dependency-ordered, de-duplicated task names for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    order: Vec<String>,
}

impl ExecutionPlan {
    /// Task names in execution order. The requested task is last.
    pub fn tasks(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name)
    }
}

impl IntoIterator for ExecutionPlan {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

/// Build the execution plan for `name`.
///
/// Fails with [`RunError::UnknownTask`] if `name` or any reachable dependency
/// is not registered, and with [`RunError::CyclicDependency`] if a cycle is
/// reachable. No action runs in either case.
pub fn plan(registry: &TaskRegistry, name: &str) -> Result<ExecutionPlan, RunError> {
    if !registry.contains(name) {
        return Err(RunError::UnknownTask(name.to_string()));
    }

    let mut walk = Walk {
        registry,
        stack: Vec::new(),
        in_progress: HashSet::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    walk.visit(name)?;

    tracing::debug!(task = name, plan = ?walk.order, "resolved execution plan");
    Ok(ExecutionPlan { order: walk.order })
}

struct Walk<'a> {
    registry: &'a TaskRegistry,
    stack: Vec<String>,
    in_progress: HashSet<String>,
    done: HashSet<String>,
    order: Vec<String>,
}

impl Walk<'_> {
    fn visit(&mut self, name: &str) -> Result<(), RunError> {
        if self.done.contains(name) {
            return Ok(());
        }
        if self.in_progress.contains(name) {
            return Err(RunError::CyclicDependency(self.cycle_path(name)));
        }

        let registry = self.registry;
        let task = registry
            .get(name)
            .ok_or_else(|| RunError::UnknownTask(name.to_string()))?;

        self.in_progress.insert(name.to_string());
        self.stack.push(name.to_string());
        for dep in &task.dependencies {
            self.visit(dep)?;
        }
        self.stack.pop();
        self.in_progress.remove(name);

        self.done.insert(name.to_string());
        self.order.push(name.to_string());
        Ok(())
    }

    /// Stack slice from the first occurrence of `name`, closed with `name`.
    fn cycle_path(&self, name: &str) -> Vec<String> {
        let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
        let mut path = self.stack[start..].to_vec();
        path.push(name.to_string());
        path
    }
}
