use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV: &str = "IIUI_SHELL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "iiui.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LauncherKind {
    #[default]
    Auto,
    Native,
    Subshell,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name used in the prompt and in diagnostics.
    pub shell_name: String,
    /// The prompt abbreviates the working directory relative to this root.
    pub prompt_root: Option<PathBuf>,
    pub color: ColorMode,
    pub launcher: LauncherKind,
    /// How long `kill` waits after SIGTERM before sending SIGKILL.
    pub kill_timeout_ms: u64,
    pub log_dir: PathBuf,
    pub banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell_name: "IIUI-Shell".into(),
            prompt_root: None,
            color: ColorMode::Auto,
            launcher: LauncherKind::Auto,
            kill_timeout_ms: 3000,
            log_dir: PathBuf::from("."),
            banner: true,
        }
    }
}

impl Config {
    /// Loads the config named by `IIUI_SHELL_CONFIG`, falling back to
    /// `iiui.toml` in the current directory and then to the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn kill_timeout(&self) -> Duration {
        Duration::from_millis(self.kill_timeout_ms)
    }

    pub fn prompt_root(&self) -> Option<PathBuf> {
        self.prompt_root
            .clone()
            .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
    }
}
