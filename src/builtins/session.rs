use async_trait::async_trait;
use strum::IntoEnumIterator;

use super::{BuiltinCommand, BuiltinCommands};
use crate::{
    cmd::{jobs::SLEEP_USAGE, Outcome},
    prelude::*,
    state::{State, PIPE_USAGE},
    style::Tint,
};

/// Help entries for syntax that is not a built-in command.
const OPERATOR_HELP: [(&str, &str); 3] = [
    ("sleep", SLEEP_USAGE),
    ("|", PIPE_USAGE),
    ("&", "Usage: <command> & Run a command in the background."),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Help;

#[async_trait]
impl BuiltinCommand for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn help(&self) -> &'static str {
        "Show help information"
    }

    async fn execute(&self, _args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let entries = BuiltinCommands::iter()
            .map(|cmd| (cmd.name(), cmd.help()))
            .chain(OPERATOR_HELP);

        let mut lines = vec![state.paint("Available Commands:", Tint::Cyan)];
        lines.extend(entries.map(|(name, desc)| {
            format!(
                "- {} : {}",
                state.paint(format!("{name:<10}"), Tint::Yellow),
                state.paint(desc, Tint::Purple)
            )
        }));

        Ok(Outcome::Text(lines.join("\n")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct History;

#[async_trait]
impl BuiltinCommand for History {
    fn name(&self) -> &'static str {
        "history"
    }

    fn help(&self) -> &'static str {
        "Show command history"
    }

    async fn execute(&self, _args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Text(
            state.history.iter().collect::<Vec<_>>().join("\n"),
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Jobs;

#[async_trait]
impl BuiltinCommand for Jobs {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn help(&self) -> &'static str {
        "Jobs List all background jobs."
    }

    async fn execute(&self, _args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let lines = state
            .jobs
            .iter()
            .map(|job| format!("[{}] {}", job.pid, job.command))
            .collect::<Vec<_>>();

        Ok(Outcome::Text(lines.join("\n")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Clear;

#[async_trait]
impl BuiltinCommand for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn help(&self) -> &'static str {
        "Clear the terminal screen"
    }

    async fn execute(&self, _args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Raw(format!(
            "{}{}",
            termion::clear::All,
            termion::cursor::Goto(1, 1)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, Config};

    #[tokio::test]
    async fn help_lists_builtins_then_operators() {
        let config = Config {
            color: ColorMode::Never,
            ..Config::default()
        };
        let mut state = State::new(config, std::env::temp_dir());

        let Outcome::Text(text) = Help.execute(&[], &mut state).await.unwrap() else {
            panic!("help prints text");
        };
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Available Commands:");
        assert!(lines[1].starts_with("- cat        : Display file content"));
        assert_eq!(lines.len(), 1 + BuiltinCommands::iter().count() + OPERATOR_HELP.len());
        assert!(lines.last().unwrap().starts_with("- &          : Usage: <command> &"));
    }

    #[tokio::test]
    async fn empty_job_table() {
        let mut state = State::new(Config::default(), std::env::temp_dir());
        assert_eq!(
            Jobs.execute(&[], &mut state).await.unwrap(),
            Outcome::text("")
        );
    }
}
