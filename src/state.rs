use std::{
    future::Future,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
};

use futures::FutureExt;

use crate::{
    cmd::{
        jobs::JobTable,
        launcher::{LaunchError, Launcher},
        Outcome,
    },
    config::Config,
    parse::parse_command,
    prelude::*,
    style::{Palette, Tint},
    system,
};

pub const HELP_HINT: &str = "Type 'help' to check valid commands.";
pub const PIPE_USAGE: &str = "Usage: <cmd1> | <cmd2> Pipe output of one command as input to another.";
pub const ECHO_USAGE: &str = "Print text or redirect: echo \"text\" > file (overwrite), echo \"text\" >> file (append), echo < file (read input)";

/// Raw command lines in the order they were entered.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_owned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of handling one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing to do; the line was blank.
    Idle,
    /// Rendered output, possibly empty.
    Report(String),
    /// Terminal control sequences, written without a trailing newline.
    Raw(String),
    Exit,
}

pub struct State {
    pub config: Config,
    pub palette: Palette,
    pub working_dir: PathBuf,
    pub history: HistoryLog,
    pub jobs: JobTable,
    pub launcher: Launcher,
    pub user: String,
    pub host: String,
}

impl State {
    pub fn new(config: Config, working_dir: PathBuf) -> Self {
        let palette = Palette::new(config.color);
        let launcher = Launcher::detect(config.launcher);

        Self {
            config,
            palette,
            working_dir,
            history: HistoryLog::default(),
            jobs: JobTable::default(),
            launcher,
            user: system::username(),
            host: system::hostname(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        crate::cmd::redirect::resolve(&self.working_dir, path)
    }

    pub fn paint(&self, text: impl std::fmt::Display, tint: Tint) -> String {
        self.palette.paint(text, tint)
    }

    /// Classifies and runs one line, then records it in the history.
    pub async fn dispatch(&mut self, line: &str) -> Dispatch {
        let line = line.trim();
        if line.is_empty() {
            return Dispatch::Idle;
        }

        let result = match parse_command(line) {
            Ok(plan) => {
                trace!(?plan, "execution plan");
                contain_panics(plan.execute(self)).await
            }
            Err(err) => Err(err.into()),
        };

        let report = match result {
            Ok(Outcome::Exit) => return Dispatch::Exit,
            Ok(Outcome::Text(text)) => text,
            Ok(Outcome::Raw(raw)) => {
                self.history.push(line);
                return Dispatch::Raw(raw);
            }
            Ok(Outcome::Silent) => String::new(),
            Err(err) => {
                debug!("command failed: {err:?}");
                self.render_error(line, &err)
            }
        };

        self.history.push(line);

        Dispatch::Report(report)
    }

    pub fn render_error(&self, line: &str, err: &ShellError) -> String {
        let shell = &self.config.shell_name;
        let mut lines = Vec::new();

        match err {
            ShellError::Launch(LaunchError::CommandNotFound { command, stdout, stderr }) => {
                if !stdout.trim_end().is_empty() {
                    lines.push(stdout.trim_end().to_owned());
                }
                lines.push(self.paint(format!("{shell}: {command}: command not found."), Tint::Red));
                lines.push(self.paint(HELP_HINT, Tint::Purple));
                if !stderr.trim_end().is_empty() {
                    lines.push(self.paint(stderr.trim_end(), Tint::Purple));
                }
                return lines.join("\n");
            }
            ShellError::Launch(spawn @ LaunchError::Spawn { .. }) => {
                lines.push(self.paint(spawn, Tint::Red));
                lines.push(format!("{shell}: {}: command not found.", spawn.command()));
            }
            ShellError::Launch(LaunchError::InvalidArguments { usage, .. }) | ShellError::Usage(usage) => {
                return self.paint(usage, Tint::Red);
            }
            ShellError::PipelineLaunch { .. } => {
                lines.push(self.paint(err, Tint::Red));
                lines.push(self.paint(PIPE_USAGE, Tint::Red));
            }
            ShellError::UnsupportedRedirection { .. } => {
                lines.push(self.paint(err, Tint::Red));
                lines.push(self.paint(ECHO_USAGE, Tint::Red));
            }
            ShellError::Parse(_) => {
                lines.push(self.paint(format!("{shell}: {line}: {err}"), Tint::Red));
            }
            ShellError::Unexpected(_) | ShellError::Io(_) => {
                lines.push(self.paint(format!("Error: {err}"), Tint::Red));
            }
            _ => lines.push(self.paint(err, Tint::Red)),
        }

        if err.wants_help_hint() {
            lines.push(self.paint(HELP_HINT, Tint::Purple));
        }

        lines.join("\n")
    }

    /// `~/…` when the working directory sits under the prompt root.
    pub fn short_dir(&self) -> String {
        abbreviate(&self.working_dir, self.config.prompt_root().as_deref())
    }

    /// The line above the input; the reader prints `$ ` itself.
    pub fn prompt_header(&self) -> String {
        format!(
            "\n{} {} {}\n",
            self.paint(format!("{}@{}", self.user, self.host), Tint::Green),
            self.paint(&self.config.shell_name, Tint::Purple),
            self.paint(self.short_dir(), Tint::Yellow),
        )
    }

    pub fn farewell(&self) -> String {
        self.paint(
            format!("Exiting {}. Goodbye!", self.config.shell_name),
            Tint::Cyan,
        )
    }
}

/// Awaits `fut`; a panic inside it becomes `ShellError::Unexpected`.
async fn contain_panics<F>(fut: F) -> Result<Outcome, ShellError>
where
    F: Future<Output = Result<Outcome, ShellError>>,
{
    AssertUnwindSafe(fut).catch_unwind().await.unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());

        error!("command panicked: {message}");
        Err(ShellError::Unexpected(format!("command panicked: {message}")))
    })
}

fn abbreviate(dir: &Path, root: Option<&Path>) -> String {
    match root.and_then(|root| dir.strip_prefix(root).ok()) {
        Some(rel) if rel.as_os_str().is_empty() => "~".into(),
        Some(rel) => format!("~/{}", rel.display()),
        None => dir.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::{ColorMode, LauncherKind};

    fn state_in(dir: &Path) -> State {
        let config = Config {
            color: ColorMode::Never,
            launcher: LauncherKind::Subshell,
            kill_timeout_ms: 500,
            ..Config::default()
        };
        State::new(config, dir.to_path_buf())
    }

    fn report(dispatch: Dispatch) -> String {
        match dispatch {
            Dispatch::Report(text) => text,
            other => panic!("expected a report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_lines_do_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        assert_eq!(state.dispatch("").await, Dispatch::Idle);
        assert_eq!(state.dispatch("  \t  ").await, Dispatch::Idle);
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn echo_redirect_then_cat() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let out = report(state.dispatch(r#"echo "hello world" > out.txt"#).await);
        assert_eq!(out, "");
        assert_eq!(report(state.dispatch("cat out.txt").await), "hello world");
        assert_eq!(report(state.dispatch("echo < out.txt").await), "hello world");
    }

    #[tokio::test]
    async fn append_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        state.dispatch("echo first >> log.txt").await;
        state.dispatch("echo second >> log.txt").await;
        assert_eq!(report(state.dispatch("echo < log.txt").await), "first\nsecond");
    }

    #[tokio::test]
    async fn mkdir_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        assert_eq!(
            report(state.dispatch("mkdir photos").await),
            "Directory photos created successfully."
        );
        assert_eq!(
            report(state.dispatch("mkdir photos").await),
            "Directory photos already exists."
        );
        assert!(dir.path().join("photos").is_dir());
    }

    #[tokio::test]
    async fn ls_piped_into_grep() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.rs", "c.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let mut state = state_in(dir.path());

        assert_eq!(report(state.dispatch("ls | grep txt").await), "a.txt\nc.txt");
    }

    #[tokio::test]
    async fn background_sleep_returns_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let start = Instant::now();
        let out = report(state.dispatch("sleep 2 &").await);
        assert!(start.elapsed() < Duration::from_secs(1));

        let job = state.jobs.iter().next().unwrap().clone();
        assert_ne!(job.pid, 0);
        assert_eq!(out, format!("[{}] Running in background: sleep 2", job.pid));
        assert_eq!(report(state.dispatch("jobs").await), format!("[{}] sleep 2", job.pid));
    }

    #[tokio::test]
    async fn invalid_background_sleep_shows_usage() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let out = report(state.dispatch("sleep soon &").await);
        assert_eq!(out, crate::cmd::jobs::SLEEP_USAGE);
        assert!(state.jobs.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_names_the_shell() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let out = report(state.dispatch("frobnicate-the-widgets now").await);
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("IIUI-Shell: frobnicate-the-widgets now: command not found.")
        );
        assert_eq!(lines.next(), Some(HELP_HINT));
    }

    #[tokio::test]
    async fn external_output_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        assert_eq!(report(state.dispatch("printf abc").await), "abc");
    }

    #[tokio::test]
    async fn redirect_on_other_builtins_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let out = report(state.dispatch("ls > listing.txt").await);
        assert!(out.starts_with("Redirection with >, >>, or < is supported for echo only"));
        assert!(!dir.path().join("listing.txt").exists());
    }

    #[tokio::test]
    async fn syntax_errors_are_reported_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let out = report(state.dispatch("ls | grep a > b").await);
        assert!(out.contains("pipes cannot be combined with redirection"));
        assert!(out.ends_with(HELP_HINT));
        assert_eq!(state.history.iter().collect::<Vec<_>>(), vec!["ls | grep a > b"]);
    }

    #[tokio::test]
    async fn exit_stops_without_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        state.dispatch("pwd").await;
        assert_eq!(state.dispatch("exit").await, Dispatch::Exit);
        assert_eq!(state.history.iter().collect::<Vec<_>>(), vec!["pwd"]);
    }

    #[tokio::test]
    async fn history_lists_trimmed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        state.dispatch("  pwd  ").await;
        state.dispatch("whoami").await;
        assert_eq!(report(state.dispatch("history").await), "pwd\nwhoami");
    }

    #[tokio::test]
    async fn clear_is_written_raw() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        let Dispatch::Raw(raw) = state.dispatch("clear").await else {
            panic!("clear should produce raw output");
        };
        assert!(raw.starts_with("\x1b["));
        assert_eq!(state.history.len(), 1);
    }

    async fn explode() -> Result<Outcome, ShellError> {
        panic!("boom")
    }

    #[tokio::test]
    async fn panics_become_unexpected_errors() {
        let err = contain_panics(explode()).await.unwrap_err();
        assert!(matches!(err, ShellError::Unexpected(ref msg) if msg.contains("boom")));

        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        assert_eq!(
            state.render_error("x", &err),
            format!("Error: command panicked: boom\n{HELP_HINT}")
        );
    }

    #[test]
    fn spawn_failures_name_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let err = ShellError::Launch(LaunchError::Spawn {
            command: "./locked.sh now".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        let out = state.render_error("./locked.sh now", &err);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].starts_with("Error executing command:"));
        assert_eq!(lines[1], "IIUI-Shell: ./locked.sh now: command not found.");
        assert_eq!(lines[2], HELP_HINT);
    }

    #[tokio::test]
    async fn redirect_target_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(dir.path());

        assert_eq!(report(state.dispatch("echo hi > my file.txt").await), "");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("my file.txt")).unwrap(),
            "hi\n"
        );
        assert_eq!(report(state.dispatch(r#"cat "my file.txt""#).await), "hi");
    }

    #[test]
    fn prompt_directory_is_abbreviated() {
        let root = Path::new("/home/ada");
        assert_eq!(abbreviate(Path::new("/home/ada"), Some(root)), "~");
        assert_eq!(abbreviate(Path::new("/home/ada/src/x"), Some(root)), "~/src/x");
        assert_eq!(abbreviate(Path::new("/etc"), Some(root)), "/etc");
        assert_eq!(abbreviate(Path::new("/etc"), None), "/etc");
    }
}
