//! REST layer of a worker
//!
//! - Summary endpoints answering group-wide queries
//! - Bounded-hop forwarding to the leader when this worker is not it
//! - Error classification into stable status codes and messages
//! - Outbound client used for the forwarding hop

pub mod client;
pub mod entities;
pub mod errors;
pub mod forward;
pub mod server;
pub mod summary;
pub mod translate;

pub use client::{HttpResponse, HttpRestClient, RestClient};
pub use errors::{ErrorMessage, RequestFailure};
pub use forward::{ForwardFlag, ForwardRequest, Forwarder};
pub use server::Worker;
pub use summary::{create_router, SummaryState};
