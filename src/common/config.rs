//! Configuration for miniconnect workers

use crate::common::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `MINICONNECT__WORKER__LEADER_URL`
pub const ENV_PREFIX: &str = "MINICONNECT";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Node ID (unique identifier)
    pub node_id: String,

    /// Worker-specific config
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Connectors known to the in-memory herder at startup
    #[serde(default)]
    pub connectors: Vec<ConnectorSeed>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load config from an optional TOML file, then from `MINICONNECT__*`
    /// environment variables (which take priority).
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_id.trim().is_empty() {
            return Err(crate::Error::InvalidConfig("node_id must not be empty".into()));
        }
        self.worker.validate()
    }
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Bind address for the REST API
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// URL other workers use to reach this one
    #[serde(default)]
    pub advertised_url: Option<String>,

    /// URL of the group leader; unset when this worker leads
    #[serde(default)]
    pub leader_url: Option<String>,

    /// How long a request waits on the herder before giving up.
    /// Long enough to ride out a rebalance that waits a full session timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Timeout for a request forwarded to the leader
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_ms: u64,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8083))
}
fn default_request_timeout() -> u64 {
    90_000
}
fn default_forward_timeout() -> u64 {
    30_000
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            advertised_url: None,
            leader_url: None,
            request_timeout_ms: default_request_timeout(),
            forward_timeout_ms: default_forward_timeout(),
        }
    }
}

impl WorkerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms)
    }

    /// The advertised URL, falling back to the bind address
    pub fn advertised_url(&self) -> String {
        match &self.advertised_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_addr),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(crate::Error::InvalidConfig(
                "request_timeout_ms must be positive".into(),
            ));
        }
        if self.forward_timeout_ms == 0 {
            return Err(crate::Error::InvalidConfig(
                "forward_timeout_ms must be positive".into(),
            ));
        }
        if let Some(leader) = &self.leader_url {
            if !leader.starts_with("http://") && !leader.starts_with("https://") {
                return Err(crate::Error::InvalidConfig(format!(
                    "leader_url must be an http(s) URL: {}",
                    leader
                )));
            }
        }
        Ok(())
    }
}

/// A connector registered with the herder at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSeed {
    pub name: String,

    #[serde(rename = "type", default = "default_connector_type")]
    pub connector_type: String,

    #[serde(default = "default_connector_state")]
    pub state: String,

    /// Number of tasks
    #[serde(default = "default_tasks")]
    pub tasks: u32,
}

fn default_connector_type() -> String {
    "source".to_string()
}
fn default_connector_state() -> String {
    "RUNNING".to_string()
}
fn default_tasks() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_worker_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(90));
        assert_eq!(config.forward_timeout(), Duration::from_secs(30));
        assert_eq!(config.advertised_url(), "http://0.0.0.0:8083");
        assert!(config.leader_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
node_id = "worker-2"

[worker]
bind_addr = "127.0.0.1:9093"
advertised_url = "http://worker-2:9093/"
leader_url = "http://worker-1:9093"
request_timeout_ms = 5000

[[connectors]]
name = "conn1"
type = "sink"
tasks = 3
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.node_id, "worker-2");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.worker.advertised_url(), "http://worker-2:9093");
        assert_eq!(
            config.worker.leader_url.as_deref(),
            Some("http://worker-1:9093")
        );
        assert_eq!(config.worker.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.worker.forward_timeout_ms, 30_000);
        assert_eq!(config.connectors.len(), 1);
        assert_eq!(config.connectors[0].connector_type, "sink");
        assert_eq!(config.connectors[0].state, "RUNNING");
        assert_eq!(config.connectors[0].tasks, 3);
    }

    #[test]
    fn test_invalid_leader_url() {
        let config = WorkerConfig {
            leader_url: Some("worker-1:8083".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = WorkerConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
