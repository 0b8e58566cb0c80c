use async_trait::async_trait;
use tokio::process::Command;

use super::BuiltinCommand;
use crate::{
    cmd::{execution_plan::SimpleCommand, launcher::LaunchError, Outcome},
    prelude::*,
    state::State,
};

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

#[derive(Debug, Default, Clone, Copy)]
pub struct Nano;

#[async_trait]
impl BuiltinCommand for Nano {
    fn name(&self) -> &'static str {
        "nano"
    }

    fn help(&self) -> &'static str {
        "Open a file in nano editor (nano <file>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let editor = SimpleCommand::new("nano", args.iter().take(1));

        // the editor owns the terminal until it exits
        Command::new(&editor.program)
            .args(&editor.args)
            .current_dir(&state.working_dir)
            .status()
            .await
            .map_err(|source| LaunchError::from_spawn(&editor, source))?;

        Ok(Outcome::Silent)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Open;

#[async_trait]
impl BuiltinCommand for Open {
    fn name(&self) -> &'static str {
        "open"
    }

    fn help(&self) -> &'static str {
        "Open any file or application using the default program (open <file or app>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        if args.is_empty() {
            return Err(ShellError::Usage(self.help()));
        }

        let opener = SimpleCommand::new(OPENER, args.iter());
        trace!("handing off to {}", opener);

        Command::new(&opener.program)
            .args(&opener.args)
            .current_dir(&state.working_dir)
            .spawn()
            .map_err(|source| LaunchError::from_spawn(&opener, source))?;

        Ok(Outcome::Silent)
    }
}
