use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use super::execution_plan::{RedirectMode, Redirection};
use crate::{parse::unescape::unescape, prelude::*};

/// Resolves `target` against `cwd` unless it is already absolute.
pub fn resolve(cwd: &Path, target: &str) -> PathBuf {
    let path = Path::new(target);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Applies an `echo` redirection. Writes return `None`; reads return the
/// file contents with trailing whitespace trimmed.
pub async fn apply(redirect: &Redirection, cwd: &Path) -> Result<Option<String>, ShellError> {
    if redirect.command.program != "echo" {
        return Err(ShellError::UnsupportedRedirection {
            command: redirect.command.program.clone(),
        });
    }

    let path = resolve(cwd, &redirect.target);
    trace!(?path, mode = ?redirect.mode, "applying redirection");

    match redirect.mode {
        RedirectMode::Truncate | RedirectMode::Append => {
            let mut line = unescape(&redirect.text)?;
            line.push('\n');

            let mut options = OpenOptions::new();
            options.create(true);
            if redirect.mode == RedirectMode::Append {
                options.append(true);
            } else {
                options.write(true).truncate(true);
            }

            let mut file = options.open(&path).await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;

            Ok(None)
        }
        RedirectMode::ReadFrom => match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content.trim_end().to_owned())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ShellError::PathNotFound {
                kind: "Input file",
                name: redirect.target.clone(),
            }),
            Err(err) => Err(err.into()),
        },
    }
}
