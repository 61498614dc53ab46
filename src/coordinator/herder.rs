//! The herder: a worker's view of the group coordinator

use crate::common::Result;
use crate::coordinator::callback::PendingOperation;
use crate::rest::entities::{ConnectorStateInfo, ConnectorsSummary};

/// Queries the REST layer issues against the group.
///
/// Queries over the global view are answered by the leader only. On any
/// other worker they fail with `Error::NotLeader(leader_url)`, and during a
/// membership change with `Error::RebalanceNeeded`.
pub trait Herder: Send + Sync + 'static {
    /// Names of all connectors in the group.
    fn connectors(&self) -> PendingOperation<Vec<String>>;

    /// Summary fields of every connector in the group.
    fn connectors_summary(&self) -> PendingOperation<ConnectorsSummary>;

    /// Status of one connector. Served from local state on any worker.
    fn connector_status(&self, name: &str) -> Result<ConnectorStateInfo>;
}
