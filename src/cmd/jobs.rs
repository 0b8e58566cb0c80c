use std::{io, path::Path};

use tokio::process::Command;

use super::{execution_plan::SimpleCommand, launcher::LaunchError};

pub const SLEEP_USAGE: &str = "Pause execution for given duration in background (<sleep 5 &>)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: u32,
    pub command: String,
}

/// Every command backgrounded this session. Entries are never removed.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
}

impl JobTable {
    /// Spawns `cmd` without waiting for it and records it.
    pub fn launch(&mut self, cmd: &SimpleCommand, cwd: &Path) -> Result<&Job, LaunchError> {
        if cmd.program == "sleep" && !valid_sleep(&cmd.args) {
            return Err(LaunchError::InvalidArguments {
                program: cmd.program.clone(),
                usage: SLEEP_USAGE,
            });
        }

        let child = Command::new(&cmd.program)
            .args(&cmd.args)
            .current_dir(cwd)
            .spawn()
            .map_err(|source| LaunchError::from_spawn(cmd, source))?;

        let pid = child.id().ok_or_else(|| LaunchError::Spawn {
            command: cmd.to_string(),
            source: io::Error::new(io::ErrorKind::Other, "process exited before it was recorded"),
        })?;

        // dropping the handle leaves the process running; tokio reaps it once it exits
        drop(child);

        let job = Job {
            pid,
            command: cmd.to_string(),
        };
        info!(pid, command = %job.command, "background job started");

        self.jobs.push(job);
        Ok(&self.jobs[self.jobs.len() - 1])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn valid_sleep(args: &[String]) -> bool {
    matches!(args, [duration] if !duration.is_empty() && duration.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[tokio::test]
    async fn launch_returns_before_the_job_finishes() {
        let mut table = JobTable::default();
        let start = Instant::now();

        let job = table
            .launch(&SimpleCommand::new("sleep", ["2"]), &std::env::temp_dir())
            .unwrap()
            .clone();

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_ne!(job.pid, 0);
        assert_eq!(job.command, "sleep 2");
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![&job]);
    }

    #[tokio::test]
    async fn sleep_needs_one_number() {
        let mut table = JobTable::default();
        for args in [vec![], vec!["x"], vec!["1", "2"], vec!["-1"]] {
            let err = table
                .launch(&SimpleCommand::new("sleep", args), &std::env::temp_dir())
                .unwrap_err();
            assert!(matches!(err, LaunchError::InvalidArguments { usage: SLEEP_USAGE, .. }));
        }
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_not_recorded() {
        let mut table = JobTable::default();
        let err = table
            .launch(
                &SimpleCommand::new("no-such-background-program", Vec::<String>::new()),
                &std::env::temp_dir(),
            )
            .unwrap_err();
        assert!(matches!(err, LaunchError::CommandNotFound { .. }));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test]
    async fn finished_jobs_stay_listed() {
        let mut table = JobTable::default();
        let cwd = std::env::temp_dir();
        table.launch(&SimpleCommand::new("true", Vec::<String>::new()), &cwd).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        table.launch(&SimpleCommand::new("sleep", ["1"]), &cwd).unwrap();

        let commands: Vec<_> = table.iter().map(|job| job.command.as_str()).collect();
        assert_eq!(commands, vec!["true", "sleep 1"]);
    }
}
