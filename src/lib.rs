//! # miniconnect
//!
//! REST layer of a worker in a connector worker group:
//! - Group-wide summary queries answered by the current leader
//! - Bounded forwarding from followers to the leader (at most two hops)
//! - Stable error classification during rebalances and timeouts
//! - An in-memory herder to run a worker standalone
//!
//! ## Architecture
//!
//! ```text
//!  client
//!    │ GET /summary/statuses
//! ┌──▼───────────┐  forward=true  ┌──────────────┐
//! │  Worker A    ├───────────────►│  Worker B    │
//! │  (follower)  │◄───────────────┤  (leader)    │
//! └──────┬───────┘    statuses    └──────┬───────┘
//!        │ Herder                        │ Herder
//!   NotLeader(B)                    connector list
//! ```
//!
//! ## Usage
//!
//! ### Start a leader and a follower
//! ```bash
//! miniconnect-worker serve --id worker-1 --bind 0.0.0.0:8083
//! miniconnect-worker serve --id worker-2 --bind 0.0.0.0:8084 \
//!   --leader http://localhost:8083
//! ```
//!
//! ### Query any worker
//! ```bash
//! miniconnect --url http://localhost:8084 statuses
//! miniconnect --url http://localhost:8084 connectors --forward false
//! ```

pub mod common;
pub mod coordinator;
pub mod rest;

// Re-export commonly used types
pub use common::{Config, Error, Result};
pub use coordinator::{Herder, MemoryHerder};
pub use rest::Worker;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
