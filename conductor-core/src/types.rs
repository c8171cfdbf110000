//! Domain types for the task registry.
//!
//! A [`Task`] pairs a name and its dependency names with an [`Action`]. Actions
//! come in two flavours:
//! - [`Action::Sync`] runs to completion when called.
//! - [`Action::Deferred`] receives a [`Completion`] and may hand it to
//!   out-of-band work (a spawned process, a thread); the executor waits for
//!   the signal before moving on.

use std::fmt;

use tokio::sync::oneshot;

use crate::error::BoxError;

/// Outcome of a single action.
pub type ActionResult = Result<(), BoxError>;

type SyncFn = dyn Fn(&[String]) -> ActionResult + Send + Sync;
type DeferredFn = dyn Fn(&[String], Completion) -> ActionResult + Send + Sync;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The unit of work a task performs.
pub enum Action {
    /// Runs inline; returning is completion.
    Sync(Box<SyncFn>),
    /// Must signal its [`Completion`] exactly once. An `Err` returned from the
    /// closure itself also counts as failure and the completion is ignored.
    Deferred(Box<DeferredFn>),
}

impl Action {
    /// Wrap a synchronous closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> ActionResult + Send + Sync + 'static,
    {
        Action::Sync(Box::new(f))
    }

    /// Wrap a closure that signals completion through a [`Completion`].
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn(&[String], Completion) -> ActionResult + Send + Sync + 'static,
    {
        Action::Deferred(Box::new(f))
    }

    /// An action that does nothing. Used by tasks that only group
    /// dependencies.
    pub fn noop() -> Self {
        Action::sync(|_| Ok(()))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Action::Deferred(_))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Sync(_) => f.write_str("Action::Sync"),
            Action::Deferred(_) => f.write_str("Action::Deferred"),
        }
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Single-use completion signal handed to a deferred action.
///
/// Every signalling method consumes the handle, so a task can report at most
/// once. Dropping it without signalling is reported by the executor as
/// [`RunError::CompletionDropped`](crate::RunError::CompletionDropped).
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<ActionResult>,
}

impl Completion {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<ActionResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Signal success.
    pub fn complete(self) {
        self.finish::<BoxError>(Ok(()));
    }

    /// Signal failure.
    pub fn fail(self, err: impl Into<BoxError>) {
        self.finish(Err(err.into()));
    }

    /// Signal the outcome of a `Result`, mapping `Ok` to success.
    pub fn finish<E: Into<BoxError>>(self, result: Result<(), E>) {
        // The receiver is gone only when the run itself was dropped.
        let _ = self.tx.send(result.map_err(Into::into));
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Per-task options supplied at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOptions {
    /// Human-readable description shown by task listings.
    pub description: Option<String>,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// A registered unit of work.
#[derive(Debug)]
pub struct Task {
    pub name: String,
    pub dependencies: Vec<String>,
    pub description: Option<String>,
    pub action: Action,
}

impl Task {
    /// `true` when the action signals completion through a [`Completion`].
    pub fn is_async(&self) -> bool {
        self.action.is_deferred()
    }
}
