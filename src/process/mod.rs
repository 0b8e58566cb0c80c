use std::fmt;

use crate::prelude::*;

pub mod signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    Zombie,
    Idle,
    Dead,
    Other(char),
}

impl From<char> for ProcessState {
    fn from(value: char) -> Self {
        match value {
            'R' => Self::Running,
            'S' => Self::Sleeping,
            'D' => Self::DiskSleep,
            'T' | 't' => Self::Stopped,
            'Z' => Self::Zombie,
            'I' => Self::Idle,
            'X' | 'x' => Self::Dead,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Sleeping => "sleeping",
            Self::DiskSleep => "disk-sleep",
            Self::Stopped => "stopped",
            Self::Zombie => "zombie",
            Self::Idle => "idle",
            Self::Dead => "dead",
            Self::Other(c) => return write!(f, "{c}"),
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: i32,
    pub name: String,
    pub state: ProcessState,
}

/// Parses one `/proc/<pid>/stat` line. The name sits in parentheses and may
/// itself contain spaces or parentheses, so the last `)` ends it.
pub fn parse_stat(line: &str) -> Option<ProcessInfo> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    if close < open {
        return None;
    }

    let pid = line[..open].trim().parse().ok()?;
    let name = line[open + 1..close].to_owned();
    let state = line[close + 1..].trim_start().chars().next()?.into();

    Some(ProcessInfo { pid, name, state })
}

#[cfg(target_os = "linux")]
pub fn stat(pid: i32) -> Option<ProcessInfo> {
    std::fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .as_deref()
        .and_then(parse_stat)
}

#[cfg(not(target_os = "linux"))]
pub fn stat(_pid: i32) -> Option<ProcessInfo> {
    None
}

/// Every process visible in `/proc`, ordered by pid. Processes that vanish
/// while the table is read are skipped.
#[cfg(target_os = "linux")]
pub fn list() -> Result<Vec<ProcessInfo>, ShellError> {
    let mut processes = std::fs::read_dir("/proc")?
        .filter_map(Result::ok)
        .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
        .filter_map(stat)
        .collect::<Vec<_>>();

    processes.sort_by_key(|p| p.pid);

    Ok(processes)
}

#[cfg(not(target_os = "linux"))]
pub fn list() -> Result<Vec<ProcessInfo>, ShellError> {
    Err(ShellError::Unsupported("process listing"))
}

/// First process whose name contains `needle`, ignoring case and skipping
/// the shell itself.
pub fn find_by_name(needle: &str) -> Result<Option<ProcessInfo>, ShellError> {
    let needle = needle.to_lowercase();
    let own = std::process::id() as i32;

    Ok(list()?
        .into_iter()
        .find(|p| p.pid != own && p.name.to_lowercase().contains(&needle)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_line_with_awkward_name() {
        let info = parse_stat("4242 (tmux: server) (x)) S 1 4242 4242 0 -1").unwrap();
        assert_eq!(info.pid, 4242);
        assert_eq!(info.name, "tmux: server) (x)");
        assert_eq!(info.state, ProcessState::Sleeping);
    }

    #[test]
    fn garbage_stat_is_rejected() {
        assert_eq!(parse_stat("not a stat line"), None);
        assert_eq!(parse_stat("x (name) R"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn own_process_is_listed() {
        let own = std::process::id() as i32;
        let processes = list().unwrap();
        let me = processes.iter().find(|p| p.pid == own).unwrap();
        assert!(!me.name.is_empty());
        assert_ne!(me.state, ProcessState::Zombie);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn find_by_name_skips_the_shell() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();

        let found = find_by_name("SLEEP").unwrap().unwrap();
        assert!(found.name.contains("sleep"));
        assert_ne!(found.pid, std::process::id() as i32);

        child.kill().await.unwrap();
    }
}
