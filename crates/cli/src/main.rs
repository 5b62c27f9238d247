//! shellcache entry point.
//!
//! Plays the host runtime for the offline cache manager: each subcommand
//! dispatches one lifecycle event (or a full registration) against the
//! configured cache database. Logging goes to stderr so command output on
//! stdout stays clean.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "shellcache")]
#[command(about = "Offline app-shell cache: install, activate, and serve cache-first")]
#[command(version)]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Populate the current cache generation with the app shell
    Install,
    /// Delete every cache that is not the current generation
    Activate,
    /// Install then activate, keeping the old generation if install fails
    Update,
    /// Fetch resources cache-first, storing network responses
    Fetch {
        /// Paths (relative to the scope) or absolute URLs
        #[arg(required = true)]
        targets: Vec<String>,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
    },
    /// List cache stores and their entry counts
    Stores,
}

fn init_logging(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);

    let config = shellcache_core::AppConfig::load()?;
    tracing::debug!(cache = %config.cache_name, db = %config.db_path.display(), "loaded configuration");

    match args.command {
        Command::Install => commands::install(&config).await,
        Command::Activate => commands::activate(&config).await,
        Command::Update => commands::update(&config).await,
        Command::Fetch { targets, method } => commands::fetch(&config, &targets, &method).await,
        Command::Stores => commands::stores(&config).await,
    }
}
