use async_trait::async_trait;

use super::{required, BuiltinCommand};
use crate::{cmd::Outcome, prelude::*, state::State};

#[derive(Debug, Default, Clone, Copy)]
pub struct Cd;

#[async_trait]
impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn help(&self) -> &'static str {
        "Change directory (cd <dir>) or go up (cd ..)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        trace!("executing cd builtin: {args:?}");

        let path = required(self, args)?;

        let full_path = match tokio::fs::canonicalize(state.resolve(path)).await {
            Ok(full_path) if full_path.is_dir() => full_path,
            _ => {
                return Err(ShellError::PathNotFound {
                    kind: "Path",
                    name: path.to_owned(),
                })
            }
        };

        trace!("cd: {:?}", full_path);

        state.working_dir = full_path;

        Ok(Outcome::Silent)
    }
}
