//! # deck-harvest CLI
//!
//! ## Usage
//!
//! ```bash
//! deck-harvest --config ./config/deck-harvest.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `deck-harvest init` | Create the events directory or SQLite schema |
//! | `deck-harvest sync` | Ingest new events from the results listing |
//! | `deck-harvest events` | List stored events |
//! | `deck-harvest export` | Dump stored events as one JSON array |
//! | `deck-harvest parse-list <file>` | Parse a saved `.dek` card list |
//!
//! Logs go to stderr and honour `RUST_LOG` (default `deck_harvest=info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use deck_harvest::config;
use deck_harvest::export;
use deck_harvest::ingest::{self, SyncOptions};
use deck_harvest::inspect;
use deck_harvest::list;
use deck_harvest::progress::ProgressMode;
use deck_harvest::store::open_store;

/// Incremental ingestion of tournament deck lists.
#[derive(Parser)]
#[command(
    name = "deck-harvest",
    about = "Incremental ingestion of published tournament deck lists",
    version,
    long_about = "deck-harvest polls the tournament results listing, skips events already \
    stored, and records every new event's decks (pilot, result, main deck, sideboard) \
    keyed by format and event ID."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/deck-harvest.toml`. If the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/deck-harvest.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Prepare storage.
    ///
    /// Creates the events directory (json backend) or the database schema
    /// (sqlite backend). Running it more than once is harmless.
    Init,

    /// Ingest new events.
    ///
    /// Fetches the listing, skips events already stored, assembles each new
    /// event and persists it. Events whose results page has no decks yet are
    /// left for a later run.
    Sync {
        /// Listing window in days. Overrides `source.lookback_days`.
        #[arg(long)]
        lookback: Option<u32>,

        /// Year applied to the listing's month/day dates. Defaults to the
        /// current year.
        #[arg(long)]
        year: Option<i32>,

        /// Maximum number of new events to process.
        #[arg(long)]
        limit: Option<usize>,

        /// Assemble events without writing them.
        #[arg(long)]
        dry_run: bool,

        /// Progress output on stderr: `off`, `human`, or `json`.
        /// Defaults to `human` on a terminal, otherwise `off`.
        #[arg(long)]
        progress: Option<ProgressMode>,
    },

    /// List stored events.
    Events {
        /// Only show events of this format (e.g. `Modern`).
        #[arg(long)]
        format: Option<String>,
    },

    /// Export stored events as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Parse a saved `.dek` card list and print main deck and sideboard.
    ParseList {
        /// Path to the card list (CRLF lines, blank line before sideboard).
        path: PathBuf,
    },
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("deck_harvest=info"));

    tracing_subscriber::fmt::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::ParseList { path } = &cli.command {
        inspect::run_parse_list(path)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = open_store(&cfg).await?;
            store.init().await?;
            println!("Storage initialized ({} backend).", store.backend_name());
        }
        Commands::Sync {
            lookback,
            year,
            limit,
            dry_run,
            progress,
        } => {
            let mut opts = SyncOptions::from_config(&cfg);
            if let Some(days) = lookback {
                if days == 0 {
                    anyhow::bail!("--lookback must be >= 1");
                }
                opts.lookback = days;
            }
            if let Some(year) = year {
                opts.reference_year = year;
            }
            opts.limit = limit;
            opts.dry_run = dry_run;

            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            ingest::run_sync(&cfg, &opts, mode).await?;
        }
        Commands::Events { format } => {
            list::run_list(&cfg, format.as_deref()).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::ParseList { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
