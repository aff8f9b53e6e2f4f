//! Shipdesk CLI - query the shipping backend from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Look up a tracking number (no login needed)
//! shipdesk track SD123456789
//!
//! # List your shipments, optionally filtered by status
//! shipdesk shipments --status IN_TRANSIT --page 2
//!
//! # Shipment counters for your account, or platform-wide as an admin
//! shipdesk stats
//! shipdesk stats --admin
//! ```
//!
//! # Environment Variables
//!
//! - `SHIPDESK_BACKEND_URL` - Base URL of the backend REST API
//! - `SHIPDESK_TOKEN` - Bearer token for commands that need a login

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shipdesk")]
#[command(author, version, about = "Shipdesk command-line tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tracking history of a shipment
    Track {
        /// Tracking number printed on the label
        number: String,
    },
    /// List your shipments
    Shipments {
        /// Page to fetch
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Only shipments in this status (e.g. `PENDING`, `IN_TRANSIT`)
        #[arg(short, long)]
        status: Option<String>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,
    },
    /// Show shipment counters
    Stats {
        /// Platform-wide counters (requires an admin token)
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipdesk_api=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    dotenvy::dotenv().ok();
    let client = commands::client()?;

    match cli.command {
        Commands::Track { number } => commands::track::run(&client, &number).await,
        Commands::Shipments {
            page,
            status,
            search,
        } => {
            commands::shipments::run(&client, page, status.as_deref(), search.as_deref()).await
        }
        Commands::Stats { admin } => commands::stats::run(&client, admin).await,
    }
}
