//! Subprocess execution boundary
//!
//! Every external tool invocation goes through the [`CommandRunner`] trait
//! so the strategies stay independent of how processes are spawned and
//! tests can script subprocess results.

use async_trait::async_trait;
use std::path::Path;

use actpack_errors::{BuildError, Result};
use tracing::debug;

/// Captured outcome of one subprocess invocation
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Abstraction over subprocess execution.
///
/// `run` captures output and reports the exit status without interpreting
/// it; `run_checked` turns a non-zero exit into `SubprocessFailed`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute a command in `cwd`, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::SpawnFailed` if the process could not be
    /// started at all. A non-zero exit is not an error at this level.
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandResult>;

    /// Execute a command and require a zero exit status.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::SubprocessFailed` carrying the rendered
    /// command line and exit code when the command exits non-zero.
    async fn run_checked(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandResult> {
        let result = self.run(program, args, cwd).await?;
        if result.success {
            Ok(result)
        } else {
            Err(BuildError::SubprocessFailed {
                command: render_command(program, args),
                exit_code: result.exit_code.unwrap_or(-1),
            }
            .into())
        }
    }
}

/// Render a command line for log and error messages.
#[must_use]
pub fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// [`CommandRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandResult> {
        debug!(
            command = %render_command(program, args),
            cwd = %cwd.display(),
            "executing command"
        );

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| BuildError::SpawnFailed {
                command: render_command(program, args),
                message: e.to_string(),
            })?;

        let result = CommandResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success {
            debug!(
                command = %render_command(program, args),
                exit_code = ?result.exit_code,
                stderr = %result.stderr,
                "command exited non-zero"
            );
        }

        Ok(result)
    }
}
