//! Agora CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Assemble a room from a file and run ticks
//! - `show`     — Print the transcript of an exported room
//! - `validate` — Check a room file without running it
//! - `init`     — Write a sample room file

use std::path::PathBuf;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "agora",
    about = "Agora — a chat room shared by autonomous LLM agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a room for a number of ticks
    Run {
        /// Room file (.yaml, .yml, .json or .toml)
        room: PathBuf,

        /// How many ticks to run
        #[arg(short, long, default_value_t = 1)]
        ticks: usize,

        /// Pause between ticks in milliseconds (overrides config)
        #[arg(long, env = "AGORA_TICK_DELAY_MS")]
        delay_ms: Option<u64>,

        /// Save the resulting room as YAML
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Print the transcript of an exported room
    Show {
        /// Exported room document
        export: PathBuf,
    },

    /// Parse and validate a room file
    Validate {
        room: PathBuf,
    },

    /// Write a sample room file
    Init {
        #[arg(default_value = "room.yaml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            room,
            ticks,
            delay_ms,
            export,
        } => commands::run::run(&room, ticks, delay_ms, export.as_deref()).await?,
        Commands::Show { export } => commands::show::run(&export)?,
        Commands::Validate { room } => commands::validate::run(&room)?,
        Commands::Init { path } => commands::init::run(&path)?,
    }

    Ok(())
}
