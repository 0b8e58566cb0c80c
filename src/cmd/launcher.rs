use std::{
    io,
    path::Path,
    process::{ExitStatus, Stdio},
};

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use thiserror::Error;
use tokio::process::Command;

use super::execution_plan::SimpleCommand;
use crate::config::LauncherKind;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{command}: command not found.")]
    CommandNotFound {
        command: String,
        stdout: String,
        stderr: String,
    },
    #[error("Error executing command: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid arguments for {program}")]
    InvalidArguments {
        program: String,
        usage: &'static str,
    },
}

impl LaunchError {
    pub fn from_spawn(command: &SimpleCommand, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::CommandNotFound {
                command: command.to_string(),
                stdout: String::new(),
                stderr: String::new(),
            }
        } else {
            Self::Spawn {
                command: command.to_string(),
                source,
            }
        }
    }

    pub fn command(&self) -> &str {
        match self {
            Self::CommandNotFound { command, .. } | Self::Spawn { command, .. } => command,
            Self::InvalidArguments { program, .. } => program,
        }
    }
}

/// What a foreground command left behind once it exited.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: Option<i32>,
    /// Empty when the child wrote straight to the terminal.
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    fn inherited(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[async_trait]
#[enum_dispatch(Launcher)]
pub trait ProcessLauncher {
    fn name(&self) -> &'static str;
    async fn execute(&self, cmd: &SimpleCommand, cwd: &Path) -> Result<CapturedOutput, LaunchError>;
}

/// Runs the program directly with the terminal's streams and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLauncher;

#[async_trait]
impl ProcessLauncher for NativeLauncher {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn execute(&self, cmd: &SimpleCommand, cwd: &Path) -> Result<CapturedOutput, LaunchError> {
        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        trace!("spawning command: {:?}", command);

        let status = command
            .status()
            .await
            .map_err(|source| LaunchError::from_spawn(cmd, source))?;

        debug!(program = %cmd.program, code = ?status.code(), "command exited");

        Ok(CapturedOutput::inherited(status))
    }
}

/// Hands the whole line to the platform shell and captures both streams.
/// Anything on stderr means the command is treated as not found.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubshellLauncher;

impl SubshellLauncher {
    #[cfg(unix)]
    fn command(cmd: &SimpleCommand) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(cmd.shell_line());
        command
    }

    #[cfg(not(unix))]
    fn command(cmd: &SimpleCommand) -> Command {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(cmd.to_string());
        command
    }
}

#[async_trait]
impl ProcessLauncher for SubshellLauncher {
    fn name(&self) -> &'static str {
        "subshell"
    }

    async fn execute(&self, cmd: &SimpleCommand, cwd: &Path) -> Result<CapturedOutput, LaunchError> {
        let mut command = Self::command(cmd);
        command.current_dir(cwd).stdin(Stdio::inherit());

        trace!("spawning subshell: {:?}", command);

        let output = command
            .output()
            .await
            .map_err(|source| LaunchError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !stderr.is_empty() {
            warn!(program = %cmd.program, "subshell wrote to stderr");
            return Err(LaunchError::CommandNotFound {
                command: cmd.to_string(),
                stdout,
                stderr,
            });
        }

        Ok(CapturedOutput {
            code: output.status.code(),
            stdout,
            stderr,
        })
    }
}

#[enum_dispatch]
#[derive(Debug, Clone, Copy)]
pub enum Launcher {
    Native(NativeLauncher),
    Subshell(SubshellLauncher),
}

impl Launcher {
    /// Picks the direct strategy wherever the host can spawn-and-wait natively.
    pub fn detect(kind: LauncherKind) -> Self {
        let launcher = match kind {
            LauncherKind::Native => NativeLauncher.into(),
            LauncherKind::Subshell => SubshellLauncher.into(),
            LauncherKind::Auto if cfg!(unix) => NativeLauncher.into(),
            LauncherKind::Auto => SubshellLauncher.into(),
        };

        info!("using {} launcher", ProcessLauncher::name(&launcher));

        launcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwd() -> std::path::PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn auto_prefers_native_on_unix() {
        let launcher = Launcher::detect(LauncherKind::Auto);
        assert_eq!(ProcessLauncher::name(&launcher), "native");

        let launcher = Launcher::detect(LauncherKind::Subshell);
        assert_eq!(ProcessLauncher::name(&launcher), "subshell");
    }

    #[tokio::test]
    async fn subshell_returns_stdout_verbatim() {
        let cmd = SimpleCommand::new("printf", ["a  b\\nc\\n"]);
        let output = SubshellLauncher.execute(&cmd, &cwd()).await.unwrap();
        assert_eq!(output.stdout, "a  b\nc\n");
        assert!(output.success());
    }

    #[tokio::test]
    async fn subshell_stderr_means_not_found() {
        let cmd = SimpleCommand::new("definitely-not-a-real-program-xyz", Vec::<String>::new());
        let err = SubshellLauncher.execute(&cmd, &cwd()).await.unwrap_err();
        let LaunchError::CommandNotFound { command, stderr, .. } = err else {
            panic!("expected not found, got {err:?}");
        };
        assert_eq!(command, "definitely-not-a-real-program-xyz");
        assert!(!stderr.is_empty());
    }

    #[tokio::test]
    async fn native_reports_missing_program() {
        let cmd = SimpleCommand::new("definitely-not-a-real-program-xyz", ["arg"]);
        let err = NativeLauncher.execute(&cmd, &cwd()).await.unwrap_err();
        assert!(matches!(err, LaunchError::CommandNotFound { .. }));
        assert_eq!(err.command(), "definitely-not-a-real-program-xyz arg");
    }

    #[tokio::test]
    async fn native_surfaces_exit_status() {
        let cmd = SimpleCommand::new("sh", ["-c", "exit 3"]);
        let output = NativeLauncher.execute(&cmd, &cwd()).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert!(output.stdout.is_empty());
    }
}
