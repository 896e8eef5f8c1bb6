use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    process::ExitCode,
};

use cardsheet_core::{
    catalog::{CardCatalog, CatalogCache},
    config::{self, AppConfig},
    DocumentAssembler, GenerationRequest,
};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Copies of a single card the command line accepts per request.
const MAX_COPIES_PER_CARD: u32 = 10;

#[derive(Debug, Parser)]
#[command(name = "cardsheet", version, about = "Print card decks on A4 sheets")]
struct Cli {
    /// Config file to load instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the catalog root.
    #[arg(long, global = true)]
    games_dir: Option<PathBuf>,
    /// Override the output directory.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List games found in the catalog.
    Games {
        /// Print the full scan as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the front cards of a game.
    Cards {
        /// Game folder name.
        game: String,
    },
    /// Write the front and back sheets for a selection.
    Generate {
        /// Game folder name.
        game: String,
        /// Copies of one card, as NAME=COUNT. Repeat for more cards.
        #[arg(short = 'c', long = "count", value_parser = parse_count)]
        counts: Vec<(String, u32)>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let user_facing = err
                .downcast_ref::<cardsheet_core::Error>()
                .map(cardsheet_core::Error::is_user_facing)
                .unwrap_or(false);
            if user_facing {
                eprintln!("{err}");
                ExitCode::from(2)
            } else {
                tracing::error!("{err:#}");
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = load_config(&cli)?;
    config.ensure_dirs()?;
    let catalog = CatalogCache::new(&config.games_dir);

    match cli.command {
        Command::Games { json } => list_games(&config, json),
        Command::Cards { game } => {
            let request = GenerationRequest::new(game);
            let games = catalog.games();
            let game = request.resolve(&games)?;
            for name in game.card_names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Generate { game, counts } => {
            let request = counts
                .into_iter()
                .fold(GenerationRequest::new(game), |request, (name, count)| {
                    request.with_count(name, i64::from(count))
                });
            let games = catalog.games();
            let game = request.resolve(&games)?;

            let mut unknown: Vec<_> = request
                .quantities
                .names()
                .filter(|name| game.front_card(name).is_none())
                .collect();
            unknown.sort();
            for name in unknown {
                warn!("{} has no card named {}; ignoring it", game.name, name);
            }

            let path = DocumentAssembler::new(&config.output_dir)
                .assemble(game, &request.quantities)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };
    if let Some(dir) = &cli.games_dir {
        config.games_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    Ok(config)
}

fn list_games(config: &AppConfig, json: bool) -> Result<()> {
    let scan = CardCatalog::scan(&config.games_dir);
    if json {
        let rendered =
            serde_json::to_string_pretty(&scan).context("failed to serialize catalog")?;
        println!("{rendered}");
        return Ok(());
    }

    if scan.games.is_empty() {
        println!("No games found in {}", config.games_dir.display());
    }
    for game in scan.games.values() {
        println!("{} ({} cards)", game.name, game.front_cards.len());
    }
    for skipped in &scan.skipped {
        println!("skipped {}: {}", skipped.name, skipped.reason);
    }
    Ok(())
}

fn parse_count(value: &str) -> Result<(String, u32), String> {
    let (name, count) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=COUNT, got '{value}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing card name in '{value}'"));
    }
    let count: u32 = count
        .trim()
        .parse()
        .map_err(|_| format!("invalid count in '{value}'"))?;
    if count > MAX_COPIES_PER_CARD {
        return Err(format!(
            "at most {MAX_COPIES_PER_CARD} copies per card, got {count}"
        ));
    }
    Ok((name.to_string(), count))
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("cardsheet.log");

    let env_filter = EnvFilter::from_default_env();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
