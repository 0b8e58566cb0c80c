use std::io;

use thiserror::Error;

use crate::{
    cmd::launcher::LaunchError,
    parse::{unescape::UnescapeError, CommandParseError},
};

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("syntax error: {0}")]
    Parse(#[from] CommandParseError),
    #[error("{kind} {name} does not exist.")]
    PathNotFound { kind: &'static str, name: String },
    #[error("{kind} {name} already exists.")]
    AlreadyExists { kind: &'static str, name: String },
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error("pipeline stage {stage} ({program}) failed to start: {source}")]
    PipelineLaunch {
        stage: usize,
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("Access denied: {0}.")]
    Permission(String),
    #[error("Process {pid} did not terminate in time, trying to kill it forcefully...")]
    Timeout { pid: i32 },
    #[error("No process with PID {pid} found.")]
    NoSuchProcess { pid: i32 },
    #[error("No process matching {name} found.")]
    NoMatchingProcess { name: String },
    #[error("Redirection with >, >>, or < is supported for echo only (got {command}).")]
    UnsupportedRedirection { command: String },
    /// Carries the usage text of the command that was called incorrectly.
    #[error("{0}")]
    Usage(&'static str),
    #[error("{0} is not supported on this platform.")]
    Unsupported(&'static str),
    #[error(transparent)]
    Escape(#[from] UnescapeError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0}")]
    Unexpected(String),
}

impl ShellError {
    /// Whether the diagnostic should end with a pointer to `help`.
    pub fn wants_help_hint(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::Launch(_) | Self::Io(_) | Self::Unexpected(_)
        )
    }
}

impl From<nix::Error> for ShellError {
    fn from(value: nix::Error) -> Self {
        Self::Io(value.into())
    }
}
