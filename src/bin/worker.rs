//! Worker binary

use clap::{Parser, Subcommand};
use miniconnect::common::{parse_duration_ms, Config, ConnectorSeed, WorkerConfig};
use miniconnect::Worker;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "miniconnect-worker")]
#[command(about = "miniconnect worker REST server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start worker server
    Serve {
        /// TOML config file (CLI flags take priority)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Node ID
        #[arg(long)]
        id: Option<String>,

        /// Bind address for the REST API
        #[arg(long)]
        bind: Option<String>,

        /// URL other workers use to reach this one
        #[arg(long)]
        advertised_url: Option<String>,

        /// Leader URL (omit when this worker is the leader)
        #[arg(long)]
        leader: Option<String>,

        /// How long to wait on the herder (e.g. 90s)
        #[arg(long)]
        request_timeout: Option<String>,

        /// Timeout of a forwarded request (e.g. 30s)
        #[arg(long)]
        forward_timeout: Option<String>,

        /// Connectors to register (comma-separated names)
        #[arg(long, value_delimiter = ',')]
        connectors: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            id,
            bind,
            advertised_url,
            leader,
            request_timeout,
            forward_timeout,
            connectors,
        } => {
            let mut config = match config {
                Some(path) => Config::load(Some(path.as_path()))?,
                None => Config {
                    node_id: id
                        .clone()
                        .ok_or_else(|| anyhow::anyhow!("--id is required without --config"))?,
                    worker: WorkerConfig::default(),
                    connectors: vec![],
                    log_level: "info".to_string(),
                },
            };

            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| config.log_level.as_str().into()),
                )
                .with(tracing_subscriber::fmt::layer())
                .init();

            // Override file config with CLI arguments
            if let Some(id) = id {
                config.node_id = id;
            }
            if let Some(bind) = bind {
                config.worker.bind_addr = bind.parse()?;
            }
            if advertised_url.is_some() {
                config.worker.advertised_url = advertised_url;
            }
            if leader.is_some() {
                config.worker.leader_url = leader;
            }
            if let Some(timeout) = request_timeout {
                config.worker.request_timeout_ms = parse_duration_ms(&timeout)?;
            }
            if let Some(timeout) = forward_timeout {
                config.worker.forward_timeout_ms = parse_duration_ms(&timeout)?;
            }
            config
                .connectors
                .extend(connectors.into_iter().map(|name| ConnectorSeed {
                    name,
                    connector_type: "source".to_string(),
                    state: "RUNNING".to_string(),
                    tasks: 1,
                }));
            config.validate()?;

            Worker::new(config).serve().await?;
        }
    }

    Ok(())
}
