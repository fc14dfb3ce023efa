//! # Care Directory CLI (`care-dir`)
//!
//! Runs the HTTP API and answers directory queries from the terminal.
//!
//! ## Usage
//!
//! ```bash
//! care-dir --config ./config/care.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `care-dir serve` | Seed the store and start the HTTP server |
//! | `care-dir search` | Filter, sort and page facilities |
//! | `care-dir get <slug>` | Show one facility |
//! | `care-dir cities` | List cities with facility counts |
//! | `care-dir service-types` | Print the service type catalog |
//!
//! When the config file does not exist, built-in defaults are used
//! (embedded seed data, assistant disabled, bind `127.0.0.1:5000`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use care_directory::config::{self, Config};
use care_directory::listing::{self, SearchArgs};
use care_directory::{logging, server};

/// Care Directory CLI: senior-care facility listings, search, and API server.
#[derive(Parser)]
#[command(
    name = "care-dir",
    about = "Care Directory: senior-care facility listings, search, and API server",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/care.toml`. See `config/care.example.toml`.
    #[arg(long, global = true, default_value = "./config/care.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the in-memory store and serve the JSON HTTP API.
    Serve,

    /// Search facilities.
    ///
    /// Filters combine with AND. Results keep seed order unless `--sort`
    /// is given.
    Search {
        /// City name or slug.
        #[arg(long)]
        city: Option<String>,

        /// Service type, e.g. `MEMORY_CARE` or `memory-care`.
        #[arg(long = "type")]
        service_type: Option<String>,

        /// Case-insensitive text in name or description.
        #[arg(long)]
        search: Option<String>,

        /// Required amenity; repeat for several.
        #[arg(long = "amenity")]
        amenities: Vec<String>,

        /// Minimum rating.
        #[arg(long)]
        rating: Option<f64>,

        /// Minimum monthly price in dollars.
        #[arg(long)]
        min_price: Option<u32>,

        /// Maximum monthly price in dollars.
        #[arg(long)]
        max_price: Option<u32>,

        /// One of `rating`, `price_asc`, `price_desc`, `name`.
        #[arg(long)]
        sort: Option<String>,

        /// 1-based page number (requires `--limit`).
        #[arg(long)]
        page: Option<usize>,

        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show one facility by slug.
    Get {
        slug: String,

        #[arg(long)]
        json: bool,
    },

    /// List cities with their facility counts.
    Cities {
        #[arg(long)]
        json: bool,
    },

    /// Print the service type catalog.
    ServiceTypes {
        #[arg(long)]
        json: bool,
    },
}

fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_or_default(&cli.config)?;
    logging::init_tracing(&cfg.logging)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Search {
            city,
            service_type,
            search,
            amenities,
            rating,
            min_price,
            max_price,
            sort,
            page,
            limit,
            json,
        } => {
            let args = SearchArgs {
                city,
                service_type,
                search,
                amenities,
                rating,
                min_price,
                max_price,
                sort,
                page,
                limit,
                json,
            };
            listing::run_search(&cfg, &args).await?;
        }
        Commands::Get { slug, json } => {
            listing::run_get(&cfg, &slug, json).await?;
        }
        Commands::Cities { json } => {
            listing::run_cities(&cfg, json).await?;
        }
        Commands::ServiceTypes { json } => {
            listing::run_service_types(json)?;
        }
    }

    Ok(())
}
