//! In-memory herder for a single worker process
//!
//! Group queries are queued and answered by a background tick loop, so every
//! [`PendingOperation`] resolves asynchronously the way it would against a
//! real coordinator. Leadership comes from config and can be changed with
//! [`MemoryHerder::set_leader`]. A single process never rebalances, so the
//! stale-configuration answer is only reachable from unit tests.

use crate::common::{ConnectorSeed, Error, Result};
use crate::coordinator::callback::{callback, Callback, PendingOperation};
use crate::coordinator::herder::Herder;
use crate::rest::entities::{ConnectorState, ConnectorStateInfo, ConnectorsSummary, TaskState};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

enum HerderRequest {
    Connectors(Callback<Vec<String>>),
    Summary(Callback<ConnectorsSummary>),
}

#[derive(Debug, Default)]
struct HerderState {
    /// `None` while this worker is the leader
    leader_url: Option<String>,
    rebalancing: bool,
    connectors: BTreeMap<String, ConnectorStateInfo>,
}

impl HerderState {
    /// Global-view queries are only served by a settled leader.
    fn check_leader(&self) -> Result<()> {
        if self.rebalancing {
            return Err(Error::RebalanceNeeded(
                "a rebalance is in progress, group view is stale".into(),
            ));
        }
        match &self.leader_url {
            Some(url) => Err(Error::NotLeader(url.clone())),
            None => Ok(()),
        }
    }

    fn handle(&self, request: HerderRequest) {
        match request {
            HerderRequest::Connectors(cb) => {
                cb.complete(
                    self.check_leader()
                        .map(|_| self.connectors.keys().cloned().collect()),
                );
            }
            HerderRequest::Summary(cb) => {
                cb.complete(self.check_leader().map(|_| self.summary()));
            }
        }
    }

    fn summary(&self) -> ConnectorsSummary {
        self.connectors
            .iter()
            .map(|(name, info)| {
                let mut fields = BTreeMap::new();
                if let Some(connector_type) = &info.connector_type {
                    fields.insert("type".to_string(), connector_type.clone());
                }
                fields.insert("state".to_string(), info.connector.state.clone());
                fields.insert("worker_id".to_string(), info.connector.worker_id.clone());
                fields.insert("tasks".to_string(), info.tasks.len().to_string());
                (name.clone(), fields)
            })
            .collect()
    }
}

pub struct MemoryHerder {
    worker_id: String,
    state: Arc<Mutex<HerderState>>,
    requests: mpsc::UnboundedSender<HerderRequest>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<HerderRequest>>>,
}

impl MemoryHerder {
    /// Create a herder; `leader_url` is `None` when this worker leads.
    pub fn new(worker_id: impl Into<String>, leader_url: Option<String>) -> Self {
        let (requests, receiver) = mpsc::unbounded_channel();
        let state = HerderState {
            leader_url,
            ..Default::default()
        };
        Self {
            worker_id: worker_id.into(),
            state: Arc::new(Mutex::new(state)),
            requests,
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Spawn the tick loop answering queued queries.
    ///
    /// Must be called from within a tokio runtime. Calling it twice returns
    /// an error. The loop exits once the herder is dropped.
    pub fn start(&self) -> Result<JoinHandle<()>> {
        let mut receiver = lock(&self.receiver)
            .take()
            .ok_or_else(|| Error::Internal("herder already started".into()))?;
        let state = self.state.clone();
        let worker_id = self.worker_id.clone();

        Ok(tokio::spawn(async move {
            tracing::info!(worker_id = %worker_id, "Herder tick loop started");
            while let Some(request) = receiver.recv().await {
                lock(&state).handle(request);
            }
            tracing::info!(worker_id = %worker_id, "Herder tick loop stopped");
        }))
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn is_leader(&self) -> bool {
        lock(&self.state).leader_url.is_none()
    }

    pub fn leader_url(&self) -> Option<String> {
        lock(&self.state).leader_url.clone()
    }

    pub fn set_leader(&self, leader_url: Option<String>) {
        tracing::info!(
            worker_id = %self.worker_id,
            leader = leader_url.as_deref().unwrap_or("self"),
            "Leader changed"
        );
        lock(&self.state).leader_url = leader_url;
    }

    #[cfg(test)]
    pub(crate) fn set_rebalancing(&self, rebalancing: bool) {
        tracing::info!(worker_id = %self.worker_id, rebalancing, "Rebalance state changed");
        lock(&self.state).rebalancing = rebalancing;
    }

    pub fn put_connector(&self, info: ConnectorStateInfo) {
        lock(&self.state).connectors.insert(info.name.clone(), info);
    }

    /// Register a connector from config, with all tasks on this worker.
    pub fn seed_connector(&self, seed: &ConnectorSeed) {
        let tasks = (0..seed.tasks)
            .map(|id| TaskState {
                id,
                state: seed.state.clone(),
                worker_id: self.worker_id.clone(),
                trace: None,
            })
            .collect();
        self.put_connector(ConnectorStateInfo {
            name: seed.name.clone(),
            connector: ConnectorState {
                state: seed.state.clone(),
                worker_id: self.worker_id.clone(),
                trace: None,
            },
            tasks,
            connector_type: Some(seed.connector_type.clone()),
        });
    }

    fn submit<T: Send + 'static>(
        &self,
        make: impl FnOnce(Callback<T>) -> HerderRequest,
    ) -> PendingOperation<T> {
        let (cb, pending) = callback();
        if self.requests.send(make(cb)).is_err() {
            tracing::warn!(worker_id = %self.worker_id, "Herder tick loop is gone, dropping request");
        }
        pending
    }
}

impl Herder for MemoryHerder {
    fn connectors(&self) -> PendingOperation<Vec<String>> {
        self.submit(HerderRequest::Connectors)
    }

    fn connectors_summary(&self) -> PendingOperation<ConnectorsSummary> {
        self.submit(HerderRequest::Summary)
    }

    fn connector_status(&self, name: &str) -> Result<ConnectorStateInfo> {
        lock(&self.state)
            .connectors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::callback::WaitError;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn seed(name: &str, tasks: u32) -> ConnectorSeed {
        ConnectorSeed {
            name: name.to_string(),
            connector_type: "source".to_string(),
            state: "RUNNING".to_string(),
            tasks,
        }
    }

    fn started(leader_url: Option<String>) -> MemoryHerder {
        let herder = MemoryHerder::new("http://worker-1:8083", leader_url);
        herder.start().unwrap();
        herder
    }

    #[tokio::test]
    async fn test_leader_lists_connectors() {
        let herder = started(None);
        herder.seed_connector(&seed("conn2", 1));
        herder.seed_connector(&seed("conn1", 2));

        let names = herder.connectors().wait(TIMEOUT).await.unwrap();
        assert_eq!(names, vec!["conn1".to_string(), "conn2".to_string()]);

        let summary = herder.connectors_summary().wait(TIMEOUT).await.unwrap();
        assert_eq!(summary["conn1"]["tasks"], "2");
        assert_eq!(summary["conn1"]["type"], "source");
        assert_eq!(summary["conn1"]["state"], "RUNNING");
        assert_eq!(summary["conn1"]["worker_id"], "http://worker-1:8083");
    }

    #[tokio::test]
    async fn test_follower_redirects() {
        let herder = started(Some("http://worker-2:8083".into()));
        assert!(!herder.is_leader());
        match herder.connectors().wait(TIMEOUT).await {
            Err(WaitError::Failed(Error::NotLeader(url))) => {
                assert_eq!(url, "http://worker-2:8083")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        herder.set_leader(None);
        assert!(herder.connectors().wait(TIMEOUT).await.is_ok());
    }

    #[tokio::test]
    async fn test_rebalance_takes_priority() {
        let herder = started(Some("http://worker-2:8083".into()));
        herder.set_rebalancing(true);
        assert!(matches!(
            herder.connectors_summary().wait(TIMEOUT).await,
            Err(WaitError::Failed(Error::RebalanceNeeded(_)))
        ));
    }

    #[tokio::test]
    async fn test_status_served_on_any_worker() {
        let herder = started(Some("http://worker-2:8083".into()));
        herder.seed_connector(&seed("conn1", 3));

        let status = herder.connector_status("conn1").unwrap();
        assert_eq!(status.tasks.len(), 3);
        assert_eq!(status.tasks[2].id, 2);

        assert!(matches!(
            herder.connector_status("missing"),
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unstarted_herder_never_answers() {
        let herder = MemoryHerder::new("w", None);
        let result = herder.connectors().wait(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(WaitError::TimedOut(_))));
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let herder = started(None);
        assert!(herder.start().is_err());
    }
}
