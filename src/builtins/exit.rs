use async_trait::async_trait;

use super::BuiltinCommand;
use crate::{cmd::Outcome, prelude::*, state::State};

#[derive(Debug, Default, Clone, Copy)]
pub struct Exit;

#[async_trait]
impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn help(&self) -> &'static str {
        "Exit the shell"
    }

    async fn execute(&self, _args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Exit)
    }
}
