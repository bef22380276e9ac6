mod brackets;
mod config;
mod results;
mod store;
mod tournaments;
mod utils;

use std::io;
use std::path::PathBuf;
use std::process;

use arena_bracket_core::lifecycle::RegistrationError;
use clap::{Parser, Subcommand};
use log::SetLoggerError;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::store::{Store, StoreError};

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    /// Path to the config file. The defaults are used if the file doesn't exist.
    #[clap(short, long, default_value = "config.toml")]
    config: PathBuf,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Tournaments {
        #[clap(subcommand)]
        command: tournaments::Command,
    },
    Brackets {
        #[clap(subcommand)]
        command: brackets::Command,
    },
    Results {
        #[clap(subcommand)]
        command: results::Command,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let config = Config::load(&args.config)?.with_environment();

    // Standard output only carries command output, the logger writes to standard error.
    pretty_env_logger::formatted_timed_builder()
        .filter_level(config.loglevel)
        .try_init()?;

    log::debug!("Using config {:?}", config);

    let store = Store::open(&config.data_dir)?;

    match args.command {
        Command::Tournaments { command } => command.run(&config, &store),
        Command::Brackets { command } => command.run(&config, &store),
        Command::Results { command } => command.run(&config, &store),
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Bracket(#[from] arena_bracket_core::Error),
    #[error("registration rejected: {0}")]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to install logger: {0}")]
    Logger(#[from] SetLoggerError),
    #[error("tournament {0} cannot be started yet")]
    CannotStart(String),
    #[error("tournament {0} has no bracket")]
    NoBracket(String),
    #[error("tournament {0} already has a bracket")]
    BracketExists(String),
    #[error("tournament {0} is retired")]
    Retired(String),
}
