use std::io::{self, Write};

use color_eyre::Result;
use tokio::select;
use tracing_subscriber::prelude::*;

use crate::{
    cmd::launcher::ProcessLauncher,
    config::Config,
    input::{InputHandle, InputMessage, ReadRequest},
    state::{Dispatch, State},
    style::Tint,
};

#[macro_use]
extern crate tracing;

pub mod banner;
pub mod builtins;
pub mod cmd;
pub mod config;
pub mod error;
pub mod input;
pub mod parse;
pub mod prelude;
pub mod process;
pub mod state;
pub mod style;
pub mod system;

const LOG_FILE: &str = "iiui-shell.log";

fn print_flush(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{text}")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let (writer, _guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&config.log_dir, LOG_FILE));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    let mut state = State::new(config, std::env::current_dir()?);
    info!(launcher = state.launcher.name(), dir = %state.working_dir.display(), "shell starting");

    if state.config.banner {
        print_flush(&banner::render(&state.palette))?;
    }

    trace!("spawning input thread");
    let mut input = InputHandle::spawn();

    let mut recalled = 0;

    loop {
        print_flush(&state.prompt_header())?;

        let request = ReadRequest {
            working_dir: state.working_dir.clone(),
            history: state.history.iter().skip(recalled).map(str::to_owned).collect(),
        };
        recalled = state.history.len();

        let line = select! {
            msg = input.read_line(request) => match msg {
                InputMessage::Line(line) => line,
                InputMessage::Eof | InputMessage::Interrupted => {
                    println!();
                    break;
                }
                InputMessage::Error(err) => {
                    error!("failed to read input: {err}");
                    println!("{}", state.paint(format!("Error: failed to read input: {err}"), Tint::Red));
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        match state.dispatch(&line).await {
            Dispatch::Idle => {}
            Dispatch::Exit => break,
            Dispatch::Report(report) if report.is_empty() => {}
            Dispatch::Raw(raw) => print_flush(&raw)?,
            Dispatch::Report(report) => println!("{report}"),
        }
    }

    println!("{}", state.farewell());
    info!("shell exiting");

    Ok(())
}
