use super::{
    execution_plan::ExecutionPlan,
    launcher::{CapturedOutput, ProcessLauncher},
    pipeline, redirect, Outcome,
};
use crate::{
    builtins::{BuiltinCommand, BuiltinCommands},
    prelude::*,
    state::State,
};

impl ExecutionPlan {
    pub async fn execute(&self, state: &mut State) -> Result<Outcome, ShellError> {
        match self {
            Self::Simple(cmd) => {
                if let Some(builtin) = BuiltinCommands::from_name(&cmd.program) {
                    trace!("executing builtin {}: {:?}", cmd.program, cmd.args);
                    return builtin.execute(&cmd.args, state).await;
                }

                let output = state.launcher.execute(cmd, &state.working_dir).await?;
                Ok(captured(output))
            }
            Self::Piped(stages) => {
                trace!("executing pipeline of {} stages", stages.len());
                pipeline::run(stages, &state.working_dir)
                    .await
                    .map(Outcome::Text)
            }
            Self::Redirected(redirection) => {
                let read = redirect::apply(redirection, &state.working_dir).await?;
                Ok(read.map_or(Outcome::Silent, Outcome::Text))
            }
            Self::Backgrounded(cmd) => {
                let job = state.jobs.launch(cmd, &state.working_dir)?;
                Ok(Outcome::Text(format!(
                    "[{}] Running in background: {}",
                    job.pid, job.command
                )))
            }
            Self::NoOp => Ok(Outcome::Silent),
        }
    }
}

fn captured(output: CapturedOutput) -> Outcome {
    if !output.success() {
        debug!(code = ?output.code, "external command reported failure");
    }

    let stdout = output.stdout.trim_end();
    if stdout.is_empty() {
        Outcome::Silent
    } else {
        Outcome::text(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_commands_still_report_output() {
        let output = CapturedOutput {
            code: Some(1),
            stdout: "partial\n\n".into(),
            stderr: String::new(),
        };
        assert!(!output.success());
        assert_eq!(captured(output), Outcome::text("partial"));
        assert_eq!(captured(CapturedOutput::default()), Outcome::Silent);
    }
}
