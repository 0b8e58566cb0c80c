use std::{fmt, str::FromStr};

use itertools::Itertools;

use crate::parse::{parse_command, CommandParseError};

/// One program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SimpleCommand {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a command from already-split words. `None` when there are none.
    pub fn from_words(mut words: Vec<String>) -> Option<Self> {
        if words.is_empty() {
            return None;
        }

        let program = words.remove(0);
        Some(Self {
            program,
            args: words,
        })
    }

    /// The command re-quoted so a POSIX shell splits it back into the same words.
    pub fn shell_line(&self) -> String {
        let mut words = std::iter::once(&self.program).chain(&self.args);
        shlex::try_join(words.clone().map(String::as_str)).unwrap_or_else(|_| words.join(" "))
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            std::iter::once(&self.program).chain(&self.args).join(" ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`
    Truncate,
    /// `>>`
    Append,
    /// `<`
    ReadFrom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub command: SimpleCommand,
    /// Argument text exactly as typed after the program name, quotes removed.
    pub text: String,
    pub mode: RedirectMode,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionPlan {
    Simple(SimpleCommand),
    /// Always at least two stages.
    Piped(Vec<SimpleCommand>),
    Redirected(Redirection),
    Backgrounded(SimpleCommand),
    NoOp,
}

impl FromStr for ExecutionPlan {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_command(s)
    }
}
