use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::{required, BuiltinCommand};
use crate::{
    cmd::Outcome,
    prelude::*,
    process::{
        self,
        signal::{terminate, Termination},
    },
    state::State,
    style::Tint,
    system::{self as host, gigabytes, Usage},
};

fn report_usage(usage: Usage, which: Option<&str>, help: &'static str) -> Result<Outcome, ShellError> {
    let text = match which {
        Some("total") => gigabytes(usage.total),
        Some("used") => format!("{}\n{:.1}%", gigabytes(usage.used), usage.percent()),
        Some("available") => gigabytes(usage.available),
        _ => return Err(ShellError::Usage(help)),
    };

    Ok(Outcome::Text(text))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ram;

#[async_trait]
impl BuiltinCommand for Ram {
    fn name(&self) -> &'static str {
        "ram"
    }

    fn help(&self) -> &'static str {
        "Check RAM info: ram total | ram used | ram available"
    }

    async fn execute(&self, args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        let which = args.first().map(String::as_str);
        if !matches!(which, Some("total" | "used" | "available")) {
            return Err(ShellError::Usage(self.help()));
        }

        report_usage(host::memory()?, which, self.help())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Disk;

#[async_trait]
impl BuiltinCommand for Disk {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn help(&self) -> &'static str {
        "Check Disk info: disk total | disk used | disk available"
    }

    async fn execute(&self, args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        let which = args.first().map(String::as_str);
        if !matches!(which, Some("total" | "used" | "available")) {
            return Err(ShellError::Usage(self.help()));
        }

        report_usage(host::disk(Path::new("/"))?, which, self.help())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Top;

#[async_trait]
impl BuiltinCommand for Top {
    fn name(&self) -> &'static str {
        "top"
    }

    fn help(&self) -> &'static str {
        "List all running processes"
    }

    async fn execute(&self, _args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        let mut lines = vec![format!("{:<10} {:<25} {:<15}", "PID", "Name", "Status")];
        lines.extend(
            process::list()?
                .into_iter()
                .map(|p| format!("{:<10} {:<25} {:<15}", p.pid, p.name, p.state.to_string())),
        );

        Ok(Outcome::Text(lines.join("\n")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Kill;

#[async_trait]
impl BuiltinCommand for Kill {
    fn name(&self) -> &'static str {
        "kill"
    }

    fn help(&self) -> &'static str {
        "Kill a running process by name (kill <name>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;

        let target = process::find_by_name(name)?.ok_or_else(|| ShellError::NoMatchingProcess {
            name: name.to_owned(),
        })?;
        let pid = target.pid;

        info!(pid, name = %target.name, "kill requested");

        let lines = match terminate(pid, state.config.kill_timeout()).await? {
            Termination::Graceful => vec![format!("Process {pid} terminated successfully.")],
            Termination::Forced => vec![
                state.paint(ShellError::Timeout { pid }, Tint::Red),
                format!("Process {pid} killed."),
            ],
        };

        Ok(Outcome::Text(lines.join("\n")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ps;

#[async_trait]
impl BuiltinCommand for Ps {
    fn name(&self) -> &'static str {
        "ps"
    }

    fn help(&self) -> &'static str {
        "Display running processes (<ps aux>). Supports piping.(<ps aux | grep python)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        if args.first().map(String::as_str) != Some("aux") {
            return Err(ShellError::Usage(self.help()));
        }

        let output = Command::new("ps")
            .arg("aux")
            .current_dir(&state.working_dir)
            .output()
            .await?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ShellError::Unexpected(format!("ps failed: {}", text.trim_end())));
        }

        Ok(Outcome::Text(text.trim_end().to_owned()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Date;

#[async_trait]
impl BuiltinCommand for Date {
    fn name(&self) -> &'static str {
        "date"
    }

    fn help(&self) -> &'static str {
        "Show current date and time"
    }

    async fn execute(&self, _args: &[String], _state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Text(
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        ))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Whoami;

#[async_trait]
impl BuiltinCommand for Whoami {
    fn name(&self) -> &'static str {
        "whoami"
    }

    fn help(&self) -> &'static str {
        "Show current user"
    }

    async fn execute(&self, _args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Text(state.user.clone()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Hostname;

#[async_trait]
impl BuiltinCommand for Hostname {
    fn name(&self) -> &'static str {
        "hostname"
    }

    fn help(&self) -> &'static str {
        "Show desktop name"
    }

    async fn execute(&self, _args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        Ok(Outcome::Text(state.host.clone()))
    }
}
