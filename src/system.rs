use std::path::Path;

use nix::{
    sys::statvfs::statvfs,
    unistd::{gethostname, Uid, User},
};

use crate::prelude::*;

const GIB: f64 = (1024 * 1024 * 1024) as f64;

/// Byte counts for a memory pool or filesystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Usage {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl Usage {
    pub fn percent(&self) -> f64 {
        let denominator = self.used + self.available;
        if denominator == 0 {
            return 0.0;
        }
        self.used as f64 / denominator as f64 * 100.0
    }
}

pub fn gigabytes(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / GIB)
}

/// Reads `MemTotal` and `MemAvailable` out of a `/proc/meminfo` dump.
pub fn parse_meminfo(raw: &str) -> Option<Usage> {
    let field = |name: &str| -> Option<u64> {
        raw.lines()
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(':'))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
    };

    let total = field("MemTotal")?;
    let available = field("MemAvailable").or_else(|| field("MemFree"))?;

    Some(Usage {
        total,
        used: total.saturating_sub(available),
        available,
    })
}

#[cfg(target_os = "linux")]
pub fn memory() -> Result<Usage, ShellError> {
    let raw = std::fs::read_to_string("/proc/meminfo")?;
    parse_meminfo(&raw).ok_or(ShellError::Unexpected("unreadable /proc/meminfo".into()))
}

#[cfg(not(target_os = "linux"))]
pub fn memory() -> Result<Usage, ShellError> {
    Err(ShellError::Unsupported("memory statistics"))
}

pub fn disk(path: &Path) -> Result<Usage, ShellError> {
    let stat = statvfs(path)?;
    let fragment = stat.fragment_size() as u64;

    let total = stat.blocks() as u64 * fragment;
    let free = stat.blocks_free() as u64 * fragment;
    let available = stat.blocks_available() as u64 * fragment;

    Ok(Usage {
        total,
        used: total.saturating_sub(free),
        available,
    })
}

pub fn username() -> String {
    User::from_uid(Uid::current())
        .ok()
        .flatten()
        .map(|user| user.name)
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "user".into())
}

pub fn hostname() -> String {
    gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".into())
}
