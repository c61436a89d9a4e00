mod logging;
mod terminal;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::{EngineConfig, GameEngine};
use simon_core::model::{LevelConfig, LevelId};

use crate::terminal::TerminalCuePlayer;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidSeed { raw: String },
    InvalidRounds { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidRounds { raw } => write!(f, "invalid --rounds value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  simon play [--level <name>] [--seed <u64>] [--timings <config.json>]");
    eprintln!("  simon demo [--level <name>] [--seed <u64>] [--timings <config.json>] [--rounds <n>]");
    eprintln!();
    eprintln!("Levels: beginner (4 symbols), intermediate (6), expert (8)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SIMON_LEVEL, SIMON_SEED, SIMON_TIMINGS, SIMON_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Demo,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

struct Args {
    level: LevelId,
    seed: Option<u64>,
    timings: Option<PathBuf>,
    rounds: usize,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut level = match std::env::var("SIMON_LEVEL") {
            Ok(raw) => parse_level(raw)?,
            Err(_) => LevelId::Beginner,
        };
        let mut seed = match std::env::var("SIMON_SEED") {
            Ok(raw) => Some(parse_seed(raw)?),
            Err(_) => None,
        };
        let mut timings = std::env::var_os("SIMON_TIMINGS").map(PathBuf::from);
        let mut rounds = 5;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--level" => level = parse_level(require_value(args, "--level")?)?,
                "--seed" => seed = Some(parse_seed(require_value(args, "--seed")?)?),
                "--timings" => timings = Some(PathBuf::from(require_value(args, "--timings")?)),
                "--rounds" => {
                    let value = require_value(args, "--rounds")?;
                    rounds = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidRounds { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            level,
            seed,
            timings,
            rounds,
        })
    }

    fn engine_config(&self) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.timings {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }
}

fn parse_level(raw: String) -> Result<LevelId, ArgsError> {
    // Load the full config so a broken level table refuses to start too.
    LevelConfig::load_named(&raw)
        .map(|config| config.id())
        .map_err(|_| ArgsError::InvalidLevel { raw })
}

fn parse_seed(raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidSeed { raw })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let mut argv = argv.into_iter();
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    logging::init_from_env();
    let config = parsed.engine_config()?;
    let cues = Arc::new(TerminalCuePlayer::default());
    let engine = GameEngine::new(cues, config)?;

    match cmd {
        Command::Play => terminal::play(&engine, parsed.level).await?,
        Command::Demo => terminal::demo(&engine, parsed.level, parsed.rounds).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
