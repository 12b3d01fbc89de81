//! punk-records command-line entry point
//!
//! `pull` refreshes the data root through vegapull; `unpack` expands the image
//! archives a previous pull left behind.

use clap::{ArgAction, Parser, Subcommand};
use punk_records::{
    ArchiveBackend, Config, Error, Language, LineConfirmation, Pipeline, Unpacker,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "punk-records", version)]
#[command(about = "Refresh the local One Piece TCG data snapshot using vegapull", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", global = true, env = "PUNK_RECORDS_CONFIG")]
    config: Option<PathBuf>,

    /// Language to fetch data for (english/en, japanese/jp)
    #[arg(short, long, visible_alias = "lang", value_name = "LANGUAGE", global = true)]
    language: Option<Language>,

    /// Data root (default: data/<language>)
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Path to the vegapull binary
    #[arg(long, value_name = "PATH", global = true)]
    vegapull: Option<PathBuf>,

    /// Archive implementation (native or cli)
    #[arg(long, value_name = "BACKEND", global = true)]
    archive_backend: Option<ArchiveBackend>,

    /// Maximum number of packs processed at once (default: unbounded)
    #[arg(long, value_name = "N", global = true)]
    max_concurrency: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wipe the data root and pull packs, cards and images
    Pull,
    /// Expand every image archive under the data root
    Unpack,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            exit_code_for_error(&e)
        }
    };
    std::process::exit(exit);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code_for_error(e: &Error) -> i32 {
    if e.is_config() { 2 } else { 1 }
}

async fn run(cli: Cli) -> punk_records::Result<()> {
    let config = load_config(&cli)?;
    info!(
        language = %config.language,
        root = ?config.data_root(),
        "starting punk-records v{}",
        env!("CARGO_PKG_VERSION")
    );

    match cli.command {
        Command::Pull => {
            let pipeline = Pipeline::from_config(&config)?;
            let summary = pipeline.run(&mut LineConfirmation::stdin()).await?;
            info!(packs = summary.packs, "pull finished");
            println!("Successfully filled the punk records with latest data");
        }
        Command::Unpack => {
            let unpacker = Unpacker::from_config(&config)?;
            let count = unpacker.run().await?;
            info!(archives = count, dir = ?unpacker.images_dir(), "unpack finished");
        }
    }
    Ok(())
}

/// Defaults, then the config file, then command-line flags
fn load_config(cli: &Cli) -> punk_records::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(language) = cli.language {
        config.language = language;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(path) = &cli.vegapull {
        config.tool.vegapull_path = path.clone();
    }
    if let Some(backend) = cli.archive_backend {
        config.archive.backend = backend;
    }
    if cli.max_concurrency.is_some() {
        config.max_concurrency = cli.max_concurrency;
    }

    config.validate()?;
    Ok(config)
}
