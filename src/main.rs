mod config;
mod script;
mod session;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};

use canvas::engine::{Clock, SystemClock};
use canvas::persist::{PersistError, PersistedState};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::script::{Replay, ReplayReport, ScriptError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Script(#[from] ScriptError),
    #[error("cannot open {path}: {source}")]
    Open { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("persisted state: {0}")]
    Persist(#[from] PersistError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pasteboard", about = "Headless driver for the pasteboard canvas core")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSONL command script against a fresh editor.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(default_value = "-", help = "Script file path, or - for stdin")]
    script: String,

    #[arg(long, help = "Persisted state to load before the script runs")]
    state: Option<String>,

    #[arg(long, help = "Write the persisted state here after the script runs")]
    persist: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(&args),
    }
}

fn run_replay(args: &ReplayArgs) -> Result<(), CliError> {
    let config = config::from_env()?;
    let mut replay = Replay::new(config, SystemClock.now_ms());

    if let Some(path) = &args.state {
        match read_state(path) {
            Ok(state) => replay.load_state(state),
            Err(error) => warn!(%path, %error, "persisted state unusable; starting empty"),
        }
    }

    let reader: Box<dyn BufRead> = if args.script == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.script).map_err(|source| CliError::Open { path: args.script.clone(), source })?;
        Box::new(BufReader::new(file))
    };
    replay.run(reader)?;

    let report = replay.report();
    info!(commands = report.commands, images = replay.document().len(), "replay finished");

    if let Some(path) = &args.persist {
        let json = report.state.to_json()?;
        fs::write(path, json).map_err(|source| CliError::Write { path: path.clone(), source })?;
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Summary => print_summary(&report),
    }
    Ok(())
}

fn read_state(path: &str) -> Result<PersistedState, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Open { path: path.to_owned(), source })?;
    Ok(PersistedState::from_json(&raw)?)
}

fn print_summary(report: &ReplayReport) {
    println!("commands: {}", report.commands);
    println!("notices:  {}", report.notices);
    match report.selected {
        Some(id) => println!("selected: {id}"),
        None => println!("selected: none"),
    }
    println!("undo: {}  redo: {}", report.can_undo, report.can_redo);
    println!("history ({} steps):", report.history.len());
    for step in &report.history {
        println!("  {step}");
    }
    println!("layers (bottom to top):");
    for item in &report.render {
        println!(
            "  {} {:.0}x{:.0} at ({:.0}, {:.0})",
            item.id, item.rect.width, item.rect.height, item.rect.x, item.rect.y
        );
    }
}
