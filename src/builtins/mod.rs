use std::collections::HashMap;

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use once_cell::sync::Lazy;
use strum::{EnumIter, IntoEnumIterator};

use crate::{cmd::Outcome, prelude::*, state::State};

pub mod cd;
pub mod desktop;
pub mod echo;
pub mod exit;
pub mod fs;
pub mod pwd;
pub mod session;
pub mod system;

#[async_trait]
#[enum_dispatch(BuiltinCommands)]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn help(&self) -> &'static str;
    async fn execute(&self, args: &[String], state: &mut State) -> Result<Outcome, ShellError>;
}

/// Declared in the order `help` lists them.
#[enum_dispatch]
#[derive(Debug, Clone, Copy, EnumIter)]
pub enum BuiltinCommands {
    Cat(fs::Cat),
    Cd(cd::Cd),
    Clear(session::Clear),
    Cp(fs::Cp),
    Date(system::Date),
    Disk(system::Disk),
    Echo(echo::Echo),
    Exit(exit::Exit),
    Help(session::Help),
    History(session::History),
    Hostname(system::Hostname),
    Kill(system::Kill),
    Ls(fs::Ls),
    Mkdir(fs::Mkdir),
    Mv(fs::Mv),
    Nano(desktop::Nano),
    Open(desktop::Open),
    Pwd(pwd::Pwd),
    Ram(system::Ram),
    Rm(fs::Rm),
    Rmdir(fs::Rmdir),
    Top(system::Top),
    Touch(fs::Touch),
    Tree(fs::Tree),
    Whoami(system::Whoami),
    Jobs(session::Jobs),
    Ps(system::Ps),
}

static REGISTRY: Lazy<HashMap<&'static str, BuiltinCommands>> =
    Lazy::new(|| BuiltinCommands::iter().map(|cmd| (cmd.name(), cmd)).collect());

impl BuiltinCommands {
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY.get(name).copied()
    }
}

/// First argument, or the command's usage as the error.
fn required<'a>(cmd: &impl BuiltinCommand, args: &'a [String]) -> Result<&'a str, ShellError> {
    args.first()
        .map(String::as_str)
        .ok_or(ShellError::Usage(cmd.help()))
}
