//! Task registry.
//!
//! The registry is an explicit value owned by the caller. It is filled once at
//! start-up and then borrowed immutably by [`plan`](crate::plan) and
//! [`run`](crate::run), so it cannot change while a run is in progress.
//!
//! Duplicate names are rejected with [`RegisterError::DuplicateTask`]; a
//! registration never replaces an earlier task.

use std::collections::HashMap;

use crate::error::RegisterError;
use crate::types::{Action, Task, TaskOptions};

/// Name → [`Task`] table. Iteration follows registration order.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    ///
    /// Dependencies are not checked here; unresolved names surface as
    /// [`RunError::UnknownTask`](crate::RunError::UnknownTask) when a plan
    /// reaches them.
    pub fn register<I, S>(
        &mut self,
        name: impl Into<String>,
        dependencies: I,
        action: Action,
        options: TaskOptions,
    ) -> Result<&Task, RegisterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        if self.index.contains_key(&name) {
            return Err(RegisterError::DuplicateTask(name));
        }

        let task = Task {
            name: name.clone(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            description: options.description,
            action,
        };
        tracing::debug!(task = %name, deps = ?task.dependencies, "registered task");

        let slot = self.tasks.len();
        self.tasks.push(task);
        self.index.insert(name, slot);
        Ok(&self.tasks[slot])
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Render a listing of every described task.
    ///
    /// ```text
    /// build        # build the project.
    ///                build[cs] # generate .NET binary.
    /// ```
    ///
    /// Continuation lines of a multi-line description are aligned under the
    /// first line. Tasks without a description are omitted.
    pub fn describe(&self) -> String {
        let described: Vec<_> = self
            .tasks
            .iter()
            .filter_map(|t| t.description.as_deref().map(|d| (t.name.as_str(), d)))
            .collect();
        let width = described.iter().map(|(n, _)| n.len()).max().unwrap_or(0);

        let mut out = String::new();
        for (name, description) in described {
            let mut lines = description.lines();
            let first = lines.next().unwrap_or_default();
            out.push_str(&format!("{name:<width$}  # {first}\n"));
            for line in lines {
                out.push_str(&format!("{:<width$}    {}\n", "", line.trim_start()));
            }
        }
        out
    }
}
