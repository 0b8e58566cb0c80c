use async_trait::async_trait;

use super::BuiltinCommand;
use crate::{cmd::Outcome, prelude::*, state::State};

#[derive(Debug, Default, Clone, Copy)]
pub struct Pwd;

#[async_trait]
impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn help(&self) -> &'static str {
        "Print current working directory"
    }

    async fn execute(&self, _args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Text(state.working_dir.display().to_string()))
    }
}
