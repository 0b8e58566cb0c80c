use std::{
    fs,
    io::{self, stdin, BufRead, StdinLock, Write},
    path::{Path, PathBuf},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context, Editor, Helper,
};

use crate::prelude::*;

pub const PROMPT: &str = "$ ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMessage {
    Line(String),
    /// Ctrl-C while the line editor owned the terminal.
    Interrupted,
    Eof,
    Error(String),
}

/// Sent with every line request so completion and recall follow the shell.
#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    pub working_dir: PathBuf,
    /// History entries recorded since the previous request.
    pub history: Vec<String>,
}

/// One input line as text. Bytes that are not UTF-8 become U+FFFD.
pub fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\n', '\r'])
        .to_owned()
}

/// Byte offset where the word ending at `pos` begins.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || matches!(c, '|' | '<' | '>' | '&' | '"'))
        .map_or(0, |(idx, c)| idx + c.len_utf8())
}

/// Entries of `cwd` (or of the directory named before the last `/`) whose
/// names start with what follows it. Directories end in `/`.
pub fn complete_path(cwd: &Path, word: &str) -> Vec<String> {
    let (dir_part, prefix) = match word.rfind('/') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    };

    let dir = if Path::new(dir_part).is_absolute() {
        PathBuf::from(dir_part)
    } else {
        cwd.join(dir_part)
    };

    let Ok(entries) = fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut matches = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(prefix) {
                return None;
            }
            let slash = if entry.path().is_dir() { "/" } else { "" };
            Some(format!("{dir_part}{name}{slash}"))
        })
        .collect::<Vec<_>>();
    matches.sort();

    matches
}

pub struct PathCompleter {
    working_dir: PathBuf,
}

impl Completer for PathCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let candidates = complete_path(&self.working_dir, &line[start..pos])
            .into_iter()
            .map(|path| Pair {
                display: path.clone(),
                replacement: path,
            })
            .collect();

        Ok((start, candidates))
    }
}

impl Hinter for PathCompleter {
    type Hint = String;
}

impl Highlighter for PathCompleter {}

impl Validator for PathCompleter {}

impl Helper for PathCompleter {}

enum LineReader {
    Editor(Box<Editor<PathCompleter, DefaultHistory>>),
    Plain(StdinLock<'static>),
}

impl LineReader {
    fn new() -> Self {
        if !termion::is_tty(&stdin()) {
            return Self::Plain(stdin().lock());
        }

        match Editor::new() {
            Ok(mut editor) => {
                editor.set_helper(Some(PathCompleter {
                    working_dir: PathBuf::new(),
                }));
                Self::Editor(Box::new(editor))
            }
            Err(err) => {
                warn!("line editor unavailable, reading plain lines: {err}");
                Self::Plain(stdin().lock())
            }
        }
    }

    fn read(&mut self, request: ReadRequest) -> InputMessage {
        let msg = self.read_once(request);

        if let InputMessage::Error(err) = &msg {
            if !self.is_plain() {
                warn!("line editor failed, reading plain lines: {err}");
                *self = Self::Plain(stdin().lock());
            }
        }

        msg
    }

    fn read_once(&mut self, request: ReadRequest) -> InputMessage {
        match self {
            Self::Editor(editor) => {
                if let Some(helper) = editor.helper_mut() {
                    helper.working_dir = request.working_dir;
                }
                for entry in &request.history {
                    if let Err(err) = editor.add_history_entry(entry.as_str()) {
                        debug!("failed to record history entry: {err}");
                    }
                }

                match editor.readline(PROMPT) {
                    Ok(line) => InputMessage::Line(line),
                    Err(ReadlineError::Interrupted) => InputMessage::Interrupted,
                    Err(ReadlineError::Eof) => InputMessage::Eof,
                    Err(err) => InputMessage::Error(err.to_string()),
                }
            }
            Self::Plain(stdin) => {
                if let Err(err) = print_prompt() {
                    return InputMessage::Error(err.to_string());
                }

                let mut raw = Vec::new();
                match stdin.read_until(b'\n', &mut raw) {
                    Ok(0) => InputMessage::Eof,
                    Ok(_) => InputMessage::Line(decode_line(&raw)),
                    Err(err) => InputMessage::Error(err.to_string()),
                }
            }
        }
    }

    fn is_plain(&self) -> bool {
        matches!(self, Self::Plain(_))
    }
}

fn print_prompt() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(PROMPT.as_bytes())?;
    stdout.flush()
}

/// Line reader living on its own thread.
///
/// The thread only touches stdin after [`InputHandle::read_line`] asks for a
/// line, so a foreground child can own the terminal while a command runs.
pub struct InputHandle {
    requests: Sender<ReadRequest>,
    lines: Receiver<InputMessage>,
}

impl InputHandle {
    pub fn spawn() -> Self {
        let (requests, mut pending) = unbounded_channel::<ReadRequest>();
        let (sender, lines) = unbounded_channel();

        std::thread::spawn(move || {
            let mut reader = LineReader::new();

            while let Some(request) = pending.blocking_recv() {
                let plain = reader.is_plain();
                let msg = reader.read(request);

                // a failed plain read leaves nothing to fall back to
                let last = match &msg {
                    InputMessage::Eof => true,
                    InputMessage::Error(_) => plain,
                    _ => false,
                };
                if sender.send(msg).is_err() || last {
                    break;
                }
            }

            trace!("input thread finished");
        });

        Self { requests, lines }
    }

    pub async fn read_line(&mut self, request: ReadRequest) -> InputMessage {
        if self.requests.send(request).is_err() {
            return InputMessage::Eof;
        }

        self.lines.recv().await.unwrap_or(InputMessage::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        assert_eq!(decode_line(b"echo caf\xe9\n"), "echo caf\u{fffd}");
        assert_eq!(decode_line(b"echo after\r\n"), "echo after");
        assert_eq!(decode_line(b"last line"), "last line");
    }

    #[test]
    fn words_start_after_spaces_and_operators() {
        assert_eq!(word_start("cat no", 6), 4);
        assert_eq!(word_start("ls|gr", 5), 3);
        assert_eq!(word_start("echo hi >out", 12), 9);
        assert_eq!(word_start("cd", 2), 0);
        assert_eq!(word_start("cat caf\u{e9} x", 9), 4);
    }

    #[test]
    fn completes_entries_of_the_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("notice.md"), "").unwrap();
        std::fs::write(dir.path().join("other.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/inner.rs"), "").unwrap();

        assert_eq!(
            complete_path(dir.path(), "not"),
            vec!["notes.txt", "notice.md"]
        );
        assert_eq!(complete_path(dir.path(), "nes"), vec!["nested/"]);
        assert_eq!(complete_path(dir.path(), "nested/i"), vec!["nested/inner.rs"]);
        assert!(complete_path(dir.path(), "zzz").is_empty());
        assert!(complete_path(dir.path(), "missing/").is_empty());
    }

    #[test]
    fn completer_replaces_only_the_current_word() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.txt"), "").unwrap();

        let completer = PathCompleter {
            working_dir: dir.path().to_path_buf(),
        };
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);

        let (start, candidates) = completer.complete("cat rep", 7, &ctx).unwrap();
        assert_eq!(start, 4);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].replacement, "report.txt");
    }
}
