use async_trait::async_trait;

use super::BuiltinCommand;
use crate::{
    cmd::Outcome,
    parse::unescape::unescape,
    prelude::*,
    state::{State, ECHO_USAGE},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

#[async_trait]
impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn help(&self) -> &'static str {
        ECHO_USAGE
    }

    async fn execute(&self, args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        if args.is_empty() {
            return Err(ShellError::Usage(ECHO_USAGE));
        }

        let words = args
            .iter()
            .map(|arg| unescape(arg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Outcome::Text(words.join(" ")))
    }
}
