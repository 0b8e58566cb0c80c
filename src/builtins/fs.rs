use std::path::{Path, PathBuf};

use async_recursion::async_recursion;
use async_trait::async_trait;

use super::{required, BuiltinCommand};
use crate::{cmd::Outcome, prelude::*, state::State, style::Tint};

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn not_found(kind: &'static str, name: &str) -> ShellError {
    ShellError::PathNotFound {
        kind,
        name: name.to_owned(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Cat;

#[async_trait]
impl BuiltinCommand for Cat {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn help(&self) -> &'static str {
        "Display file content (cat <file>). Supports piping (<cat file.txt | grep keyword>, <cat file.txt | sort | uniq>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;

        match tokio::fs::read_to_string(state.resolve(name)).await {
            Ok(content) => Ok(Outcome::text(content.trim())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(not_found("File", name)),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Ls;

#[async_trait]
impl BuiltinCommand for Ls {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn help(&self) -> &'static str {
        "List files in current directory. Supports piping (<ls | grep <type>>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let dir = match args.first() {
            Some(name) => state.resolve(name),
            None => state.working_dir.clone(),
        };

        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&dir).await.map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => not_found("Directory", &dir.display().to_string()),
            _ => err.into(),
        })?;
        while let Some(entry) = read_dir.next_entry().await? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
        }
        entries.sort();

        let listing = entries
            .into_iter()
            .map(|(name, is_dir)| if is_dir { state.paint(name, Tint::Purple) } else { name })
            .collect::<Vec<_>>();

        Ok(Outcome::Text(listing.join("\n")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Mkdir;

#[async_trait]
impl BuiltinCommand for Mkdir {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn help(&self) -> &'static str {
        "Create a new directory (mkdir <dir>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;
        let path = state.resolve(name);

        if exists(&path).await {
            return Err(ShellError::AlreadyExists {
                kind: "Directory",
                name: name.to_owned(),
            });
        }

        tokio::fs::create_dir(&path).await?;
        Ok(Outcome::Text(format!("Directory {name} created successfully.")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Touch;

#[async_trait]
impl BuiltinCommand for Touch {
    fn name(&self) -> &'static str {
        "touch"
    }

    fn help(&self) -> &'static str {
        "Create an empty file (touch <file>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;
        let path = state.resolve(name);

        if exists(&path).await {
            return Err(ShellError::AlreadyExists {
                kind: "File",
                name: name.to_owned(),
            });
        }

        tokio::fs::File::create(&path).await?;
        Ok(Outcome::Text(format!("File {name} created successfully.")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Rm;

#[async_trait]
impl BuiltinCommand for Rm {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn help(&self) -> &'static str {
        "Remove a file (rm <file>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;
        let path = state.resolve(name);

        if !exists(&path).await {
            return Err(not_found("File", name));
        }
        if path.is_dir() {
            return Err(ShellError::Usage("rm removes files only; use rmdir <dir> for directories"));
        }

        tokio::fs::remove_file(&path).await?;
        Ok(Outcome::Text(format!("File {name} removed successfully.")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Rmdir;

#[async_trait]
impl BuiltinCommand for Rmdir {
    fn name(&self) -> &'static str {
        "rmdir"
    }

    fn help(&self) -> &'static str {
        "Remove a directory (rmdir <dir>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;
        let path = state.resolve(name);

        if !path.is_dir() {
            return Err(not_found("Directory", name));
        }

        tokio::fs::remove_dir_all(&path).await?;
        Ok(Outcome::Text(format!("Directory {name} removed successfully.")))
    }
}

/// Where `src` ends up: inside `dest` when that is an existing directory.
fn destination(src: &Path, dest: PathBuf) -> PathBuf {
    match src.file_name() {
        Some(file_name) if dest.is_dir() => dest.join(file_name),
        _ => dest,
    }
}

#[async_recursion]
async fn copy_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dest).await?;

    let mut entries = tokio::fs::read_dir(src).await?;
    while let Some(entry) = entries.next_entry().await? {
        let target = dest.join(entry.file_name());
        if entry.file_type().await?.is_dir() {
            copy_dir(&entry.path(), &target).await?;
        } else {
            tokio::fs::copy(entry.path(), &target).await?;
        }
    }

    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Cp;

#[async_trait]
impl BuiltinCommand for Cp {
    fn name(&self) -> &'static str {
        "cp"
    }

    fn help(&self) -> &'static str {
        "Copy a file (cp <source_file> <destination_file>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;
        let src = state.resolve(name);
        if !exists(&src).await {
            return Err(not_found("Source path", name));
        }

        let dest = args
            .get(1)
            .map(|dest| state.resolve(dest))
            .ok_or(ShellError::Usage("Enter destination path."))?;
        let dest = destination(&src, dest);

        if src.is_dir() {
            if exists(&dest).await {
                return Err(ShellError::AlreadyExists {
                    kind: "Directory",
                    name: dest.display().to_string(),
                });
            }
            copy_dir(&src, &dest).await?;
            Ok(Outcome::Text(format!("Directory copied to {}", dest.display())))
        } else {
            tokio::fs::copy(&src, &dest).await?;
            Ok(Outcome::Text(format!("File copied to {}", dest.display())))
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Mv;

#[async_trait]
impl BuiltinCommand for Mv {
    fn name(&self) -> &'static str {
        "mv"
    }

    fn help(&self) -> &'static str {
        "Move a file (mv <source_file> <destination_file>)"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let name = required(self, args)?;
        let src = state.resolve(name);
        if !exists(&src).await {
            return Err(not_found("Source path", name));
        }

        let dest = args
            .get(1)
            .map(|dest| state.resolve(dest))
            .ok_or(ShellError::Usage("Enter destination path."))?;
        let dest = destination(&src, dest);

        if exists(&dest).await {
            return Err(ShellError::AlreadyExists {
                kind: "File",
                name: dest.display().to_string(),
            });
        }
        if let Some(parent) = dest.parent() {
            if !parent.is_dir() {
                return Err(not_found("Destination path", &parent.display().to_string()));
            }
        }

        tokio::fs::rename(&src, &dest).await?;
        Ok(Outcome::Text(format!("File moved to {}", dest.display())))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Tree;

impl Tree {
    #[async_recursion]
    async fn walk(&self, path: &Path, prefix: &str, state: &State, out: &mut Vec<String>) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        out.push(format!(
            "{}{}/",
            state.paint(prefix, Tint::Cyan),
            state.paint(name, Tint::Purple)
        ));

        let prefix = format!("{prefix}-------");

        let mut entries = Vec::new();
        match tokio::fs::read_dir(path).await {
            Ok(mut dir) => {
                while let Ok(Some(entry)) = dir.next_entry().await {
                    entries.push(entry.path());
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
                out.push(format!("{prefix}[Permission Denied]"));
                return;
            }
            Err(err) => {
                warn!(?path, "tree: cannot read directory: {err}");
                return;
            }
        }
        entries.sort();

        for entry in entries {
            if entry.is_dir() {
                self.walk(&entry, &prefix, state, out).await;
            } else {
                let file = entry
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                out.push(format!("{}{file}", state.paint(&prefix, Tint::Cyan)));
            }
        }
    }
}

#[async_trait]
impl BuiltinCommand for Tree {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn help(&self) -> &'static str {
        "Display directory tree structure"
    }

    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError> {
        let root = match args.first() {
            Some(name) => state.resolve(name),
            None => state.working_dir.clone(),
        };
        if !root.is_dir() {
            return Err(not_found("Path", &root.display().to_string()));
        }

        let mut out = Vec::new();
        self.walk(&root, "", state, &mut out).await;

        Ok(Outcome::Text(out.join("\n")))
    }
}
