//! Common utilities and types shared across miniconnect

pub mod config;
pub mod error;
pub mod tracing_middleware;
pub mod utils;

pub use config::{Config, ConnectorSeed, WorkerConfig};
pub use error::{Error, Result};
pub use tracing_middleware::{request_id, request_tracing_middleware, REQUEST_ID_HEADER};
pub use utils::{join_url, parse_duration, parse_duration_ms};
