//! Argument parsing and command execution for `blocklog-inspect`.

use std::path::PathBuf;

use blocklog_core::types::{PlayerId, Tick};
use blocklog_history::{load_config, ConfigError, HistoryConfig};
use blocklog_persist::{summarize_segments, PersistError};
use thiserror::Error;

use crate::report::{self, TrailSummary};

pub const USAGE: &str = "\
Usage: blocklog-inspect [OPTIONS] <COMMAND>
  segments <world> [<player>]   List history segments per player
  dump <file>                   Print every record of one segment
  trails <world> <player>       List redo trails with entry counts
Options:
  --config <path>   History config (RON); defaults apply without it
  --base <dir>      Override the archive base directory
  --json            Emit JSON instead of markdown tables";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid player id {0:?}")]
    InvalidPlayer(String),
    #[error("no command given")]
    NoCommand,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Segments {
        world: String,
        player: Option<PlayerId>,
    },
    Dump {
        file: PathBuf,
    },
    Trails {
        world: String,
        player: PlayerId,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub base: Option<PathBuf>,
    pub json: bool,
    pub command: Command,
}

fn parse_player(raw: &str) -> Result<PlayerId, CliError> {
    raw.parse()
        .map(PlayerId)
        .map_err(|_| CliError::InvalidPlayer(raw.to_string()))
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<Args, CliError> {
    let mut config = None;
    let mut base = None;
    let mut json = false;
    let mut positional: Vec<&str> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or(CliError::MissingValue("--config"))?;
                config = Some(PathBuf::from(value));
            }
            "--base" => {
                i += 1;
                let value = args.get(i).ok_or(CliError::MissingValue("--base"))?;
                base = Some(PathBuf::from(value));
            }
            "--json" => json = true,
            "--help" | "-h" => positional = vec!["help"],
            other if other.starts_with("--") => {
                return Err(CliError::UnknownArgument(other.to_string()));
            }
            other => positional.push(other),
        }
        i += 1;
    }

    let command = match positional.as_slice() {
        [] => return Err(CliError::NoCommand),
        ["help", ..] => Command::Help,
        ["segments", world] => Command::Segments {
            world: world.to_string(),
            player: None,
        },
        ["segments", world, player] => Command::Segments {
            world: world.to_string(),
            player: Some(parse_player(player)?),
        },
        ["dump", file] => Command::Dump {
            file: PathBuf::from(file),
        },
        ["trails", world, player] => Command::Trails {
            world: world.to_string(),
            player: parse_player(player)?,
        },
        [first, ..] => return Err(CliError::UnknownArgument(first.to_string())),
    };

    Ok(Args {
        config,
        base,
        json,
        command,
    })
}

fn resolve_config(args: &Args) -> Result<HistoryConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => HistoryConfig::default(),
    };
    if let Some(base) = &args.base {
        config.base_path = base.clone();
    }
    Ok(config)
}

/// Run a parsed command and return what should be printed.
pub fn run(args: &Args) -> Result<String, CliError> {
    if args.command == Command::Help {
        return Ok(USAGE.to_string());
    }
    let config = resolve_config(args)?;
    let store = config.open_store();
    log::debug!("inspecting archive at {}", store.base().display());

    match &args.command {
        Command::Segments { world, player } => {
            let summaries = summarize_segments(&store, world, *player)?;
            if args.json {
                Ok(report::to_json(&summaries)?)
            } else {
                Ok(report::format_segments(&summaries))
            }
        }
        Command::Dump { file } => {
            let records = store.read_segment(file)?;
            if args.json {
                Ok(report::to_json(&records)?)
            } else {
                Ok(report::format_records(&records))
            }
        }
        Command::Trails { world, player } => {
            let trails: Vec<TrailSummary> = store
                .read_redo_trails(world, *player, Tick(0))?
                .iter()
                .map(|trail| TrailSummary::new(*player, trail))
                .collect();
            if args.json {
                Ok(report::to_json(&trails)?)
            } else {
                Ok(report::format_trails(&trails))
            }
        }
        Command::Help => Ok(USAGE.to_string()),
    }
}
