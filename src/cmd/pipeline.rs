use std::{io, path::Path, process::Stdio};

use tokio::process::{Child, ChildStdout, Command};

use super::execution_plan::SimpleCommand;
use crate::prelude::*;

/// Runs every stage as its own process, with stage `i`'s stdout wired straight
/// into stage `i + 1`'s stdin, and returns what the last stage printed.
pub async fn run(stages: &[SimpleCommand], cwd: &Path) -> Result<String, ShellError> {
    let Some((last, upstream_stages)) = stages.split_last() else {
        return Ok(String::new());
    };

    let mut upstream: Vec<Child> = Vec::with_capacity(upstream_stages.len());
    let mut carried: Option<ChildStdout> = None;

    for (idx, stage) in upstream_stages.iter().enumerate() {
        let mut child = match spawn_stage(stage, cwd, carried.take()) {
            Ok(child) => child,
            Err(source) => {
                abort(upstream).await;
                return Err(launch_error(idx, stage, source));
            }
        };

        carried = child.stdout.take();
        upstream.push(child);
    }

    let last_idx = upstream_stages.len();
    let child = match spawn_stage(last, cwd, carried.take()) {
        Ok(child) => child,
        Err(source) => {
            abort(upstream).await;
            return Err(launch_error(last_idx, last, source));
        }
    };

    trace!(stages = stages.len(), "pipeline running, collecting final stage");

    let output = child.wait_with_output().await?;

    for mut child in upstream {
        if let Err(err) = child.wait().await {
            warn!("failed to reap pipeline stage: {err}");
        }
    }

    debug!(code = ?output.status.code(), "pipeline finished");

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_owned())
}

/// The `Command` is dropped on return, which closes the parent's copy of the
/// upstream pipe so only the child holds it.
fn spawn_stage(stage: &SimpleCommand, cwd: &Path, input: Option<ChildStdout>) -> io::Result<Child> {
    let stdin: Stdio = match input {
        Some(stdout) => stdout.try_into()?,
        None => Stdio::inherit(),
    };

    let mut cmd = Command::new(&stage.program);
    cmd.args(&stage.args)
        .current_dir(cwd)
        .stdin(stdin)
        .stdout(Stdio::piped());

    trace!("spawning pipeline stage: {:?}", cmd);

    cmd.spawn()
}

async fn abort(children: Vec<Child>) {
    for mut child in children {
        if let Err(err) = child.kill().await {
            warn!("failed to kill pipeline stage: {err}");
        }
    }
}

fn launch_error(stage: usize, cmd: &SimpleCommand, source: io::Error) -> ShellError {
    error!(stage, program = %cmd.program, "pipeline stage failed to launch: {source}");

    ShellError::PipelineLaunch {
        stage,
        program: cmd.program.clone(),
        source,
    }
}
