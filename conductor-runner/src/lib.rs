//! External command runner: shell invocation in interactive or captured mode.

pub mod command;
mod error;

pub use command::{passthrough, CommandInvocation, ExitResult, Mode};
pub use error::CommandError;
