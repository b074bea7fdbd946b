//! skillmeter CLI: timed practice quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "skillmeter", version, about = "Timed practice quizzes in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a timed practice session
    Practice {
        /// Path to a .toml question bank (default: built-in bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Session length in seconds
        #[arg(long)]
        duration: Option<u32>,

        /// Clock period in milliseconds (one tick = one second of countdown)
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Result format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a question bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillmeter=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Practice {
            bank,
            duration,
            tick_ms,
            format,
            config,
        } => commands::practice::execute(bank, duration, tick_ms, format, config).await,
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
