use std::time::Duration;

use nix::{
    errno::Errno,
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use tokio::time::Instant;

use super::ProcessState;
use crate::prelude::*;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Exited after SIGTERM within the timeout.
    Graceful,
    /// Ignored SIGTERM and was sent SIGKILL.
    Forced,
}

fn send(pid: i32, signal: Option<Signal>) -> Result<(), ShellError> {
    kill(Pid::from_raw(pid), signal).map_err(|errno| match errno {
        Errno::ESRCH => ShellError::NoSuchProcess { pid },
        Errno::EPERM => ShellError::Permission(format!("cannot signal process {pid}")),
        other => other.into(),
    })
}

/// A zombie has exited and only waits to be reaped, so it counts as gone.
pub fn is_alive(pid: i32) -> bool {
    send(pid, None).is_ok()
        && !matches!(super::stat(pid), Some(info) if info.state == ProcessState::Zombie)
}

/// Sends SIGTERM, waits up to `timeout` for the process to go away, then
/// falls back to SIGKILL.
pub async fn terminate(pid: i32, timeout: Duration) -> Result<Termination, ShellError> {
    debug!(pid, "sending SIGTERM");
    send(pid, Some(Signal::SIGTERM))?;

    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if !is_alive(pid) {
            return Ok(Termination::Graceful);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    if !is_alive(pid) {
        return Ok(Termination::Graceful);
    }

    warn!(pid, ?timeout, "process ignored SIGTERM, sending SIGKILL");
    match send(pid, Some(Signal::SIGKILL)) {
        // exited between the last poll and SIGKILL
        Err(ShellError::NoSuchProcess { .. }) => Ok(Termination::Graceful),
        Err(err) => Err(err),
        Ok(()) => Ok(Termination::Forced),
    }
}
