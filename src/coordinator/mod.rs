//! Coordinator facade
//!
//! The REST layer talks to the group through the [`Herder`] trait:
//! - Asynchronous queries over the global view, answered by the leader
//! - Local, synchronous per-connector status lookups
//! - Single-assignment [`PendingOperation`] handles for every async query

pub mod callback;
pub mod herder;
pub mod memory;

pub use callback::{callback, Callback, PendingOperation, WaitError};
pub use herder::Herder;
pub use memory::MemoryHerder;
