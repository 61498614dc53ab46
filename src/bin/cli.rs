//! CLI for querying workers

use clap::{Parser, Subcommand};
use miniconnect::rest::summary::{CONNECTORS_PATH, STATUSES_PATH};
use miniconnect::rest::{HttpRestClient, RestClient};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "miniconnect")]
#[command(about = "miniconnect worker group CLI")]
#[command(version)]
struct Cli {
    /// Worker URL
    #[arg(long, default_value = "http://localhost:8083")]
    url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "120")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary of every connector in the group
    Connectors {
        /// Explicit forward flag (true/false)
        #[arg(long)]
        forward: Option<bool>,
    },

    /// Status of every connector in the group
    Statuses {
        /// Explicit forward flag (true/false)
        #[arg(long)]
        forward: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = HttpRestClient::new(Duration::from_secs(cli.timeout))?;

    let (path, forward) = match cli.command {
        Commands::Connectors { forward } => (CONNECTORS_PATH, forward),
        Commands::Statuses { forward } => (STATUSES_PATH, forward),
    };

    let mut url = miniconnect::common::join_url(&cli.url, path);
    if let Some(forward) = forward {
        url = format!("{}?forward={}", url, forward);
    }

    let response = client
        .http_request::<serde_json::Value>(&url, reqwest::Method::GET, None, None)
        .await?;
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    Ok(())
}
