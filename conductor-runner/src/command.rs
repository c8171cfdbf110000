//! Command invocation.
//!
//! Commands are plain text handed to the platform shell, so callers can build
//! them by concatenation and append opaque flag strings verbatim.
//!
//! Two modes:
//! - [`Mode::Interactive`] — the child shares this process's stdin/stdout/stderr.
//! - [`Mode::Captured`] — output is buffered and forwarded to the log stream
//!   once the child has exited, whatever its status.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{spawn_err, CommandError};

/// How the child's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Interactive,
    #[default]
    Captured,
}

/// A command line plus how to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub command: String,
    pub mode: Mode,
    /// Overrides merged over the inherited environment.
    pub env: Vec<(String, String)>,
    pub current_dir: Option<PathBuf>,
}

/// A successful (exit code 0) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitResult {
    pub code: i32,
    /// Empty in interactive mode.
    pub stdout: String,
    /// Empty in interactive mode.
    pub stderr: String,
    pub duration: Duration,
}

impl CommandInvocation {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            mode: Mode::default(),
            env: Vec::new(),
            current_dir: None,
        }
    }

    pub fn interactive(mut self) -> Self {
        self.mode = Mode::Interactive;
        self
    }

    pub fn captured(mut self) -> Self {
        self.mode = Mode::Captured;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Append a space-separated piece of command text. Empty text is skipped.
    pub fn arg(mut self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if !text.is_empty() {
            self.command.push(' ');
            self.command.push_str(text);
        }
        self
    }

    /// Append an externally supplied flag string verbatim. Its content is
    /// never parsed or validated; an empty string appends nothing.
    pub fn append_flags(self, flags: &str) -> Self {
        self.arg(flags)
    }

    /// Run the command and wait for it to exit.
    pub async fn execute(&self) -> Result<ExitResult, CommandError> {
        debug!(command = %self.command, mode = ?self.mode, "executing");
        let started = Instant::now();

        let mut cmd = shell_command(&self.command);
        cmd.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let (status, stdout, stderr) = match self.mode {
            Mode::Interactive => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
                let status = cmd
                    .status()
                    .await
                    .map_err(|e| spawn_err(&self.command, e))?;
                (status, String::new(), String::new())
            }
            Mode::Captured => {
                cmd.stdin(Stdio::null());
                let output = cmd
                    .output()
                    .await
                    .map_err(|e| spawn_err(&self.command, e))?;
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                forward_output(&stdout, &stderr);
                (output.status, stdout, stderr)
            }
        };

        let code = check_status(&self.command, status)?;
        let duration = started.elapsed();
        debug!(
            command = %self.command,
            code,
            elapsed_ms = duration.as_millis() as u64,
            "command finished"
        );
        Ok(ExitResult {
            code,
            stdout,
            stderr,
            duration,
        })
    }
}

/// Read an environment variable holding pass-through flags; unset → empty.
pub fn passthrough(var: &str) -> String {
    std::env::var(var).unwrap_or_default()
}

fn check_status(command: &str, status: ExitStatus) -> Result<i32, CommandError> {
    match status.code() {
        Some(0) => Ok(0),
        Some(code) => match shell_start_failure(code) {
            Some(kind) => Err(spawn_err(
                command,
                io::Error::new(kind, format!("shell could not start the program (code {code})")),
            )),
            None => Err(CommandError::Failed {
                command: command.to_string(),
                code,
            }),
        },
        None => Err(CommandError::Terminated {
            command: command.to_string(),
        }),
    }
}

fn forward_output(stdout: &str, stderr: &str) {
    for line in stdout.lines() {
        info!("{line}");
    }
    for line in stderr.lines() {
        warn!("{line}");
    }
}

/// Shell exit codes that mean the program never ran.
#[cfg(unix)]
fn shell_start_failure(code: i32) -> Option<io::ErrorKind> {
    match code {
        126 => Some(io::ErrorKind::PermissionDenied),
        127 => Some(io::ErrorKind::NotFound),
        _ => None,
    }
}

#[cfg(windows)]
fn shell_start_failure(code: i32) -> Option<io::ErrorKind> {
    match code {
        9009 => Some(io::ErrorKind::NotFound),
        _ => None,
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_flags_is_verbatim() {
        let inv = CommandInvocation::new("koka -isrc").append_flags("--foo  \"bar baz\"");
        assert_eq!(inv.command, "koka -isrc --foo  \"bar baz\"");
    }

    #[test]
    fn append_empty_flags_is_noop() {
        let inv = CommandInvocation::new("node test").append_flags("");
        assert_eq!(inv.command, "node test");
    }

    #[test]
    fn default_mode_is_captured() {
        assert_eq!(CommandInvocation::new("true").mode, Mode::Captured);
        assert_eq!(
            CommandInvocation::new("true").interactive().mode,
            Mode::Interactive
        );
    }

    #[test]
    fn passthrough_unset_is_empty() {
        assert_eq!(passthrough("CONDUCTOR_SURELY_UNSET_VARIABLE"), "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captured_output_is_returned() {
        let result = CommandInvocation::new("echo hello; echo oops 1>&2")
            .execute()
            .await
            .expect("execute");
        assert_eq!(result.code, 0);
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_command_failed() {
        let err = CommandInvocation::new("exit 3").execute().await.unwrap_err();
        assert!(matches!(err, CommandError::Failed { code: 3, .. }), "got {err:?}");
        assert_eq!(err.exit_code(), Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn env_overrides_reach_child() {
        let result = CommandInvocation::new("echo $CONDUCTOR_TEST_VAR")
            .env("CONDUCTOR_TEST_VAR", "from-env")
            .execute()
            .await
            .expect("execute");
        assert!(result.stdout.contains("from-env"));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_failure_is_distinct_from_exit_code() {
        let inv = CommandInvocation::new("true").current_dir("/definitely/not/a/dir");
        let err = tokio_test::block_on(inv.execute()).unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }), "got {err:?}");
        assert_eq!(err.exit_code(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_executable_is_spawn_failure() {
        let err = CommandInvocation::new("conductor-no-such-binary-xyz")
            .execute()
            .await
            .unwrap_err();
        match &err {
            CommandError::Spawn { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
        assert_eq!(err.exit_code(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_executable_file_is_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("script.sh"), "echo hi\n").unwrap();
        let err = CommandInvocation::new("./script.sh")
            .current_dir(dir.path())
            .execute()
            .await
            .unwrap_err();
        // Root may execute files without the executable bit.
        if let CommandError::Spawn { source, .. } = &err {
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn killed_by_signal_is_terminated() {
        let err = CommandInvocation::new("kill -9 $$").execute().await.unwrap_err();
        assert!(matches!(err, CommandError::Terminated { .. }), "got {err:?}");
        assert_eq!(err.exit_code(), None);
        assert!(err.to_string().contains("terminated by a signal"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn interactive_mode_reports_status() {
        let result = CommandInvocation::new("true")
            .interactive()
            .execute()
            .await
            .expect("execute");
        assert_eq!(result.code, 0);
        assert!(result.stdout.is_empty());

        let err = CommandInvocation::new("exit 2")
            .interactive()
            .execute()
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(2));
    }
}
