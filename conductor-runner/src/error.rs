use thiserror::Error;

/// Error surface for spawning and awaiting external commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started (missing shell or executable,
    /// permission denied). Distinct from a non-zero exit.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited with a non-zero code.
    #[error("`{command}` exited with code {code}")]
    Failed { command: String, code: i32 },

    /// The process was killed by a signal and has no exit code.
    #[error("`{command}` was terminated by a signal")]
    Terminated { command: String },
}

impl CommandError {
    /// Exit code for [`CommandError::Failed`].
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub(crate) fn spawn_err(command: impl Into<String>, source: std::io::Error) -> CommandError {
    CommandError::Spawn {
        command: command.into(),
        source,
    }
}
