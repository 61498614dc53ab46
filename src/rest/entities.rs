//! JSON entities exchanged over the REST API

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Connector name → summary fields (`type`, `state`, `worker_id`, `tasks`).
pub type ConnectorsSummary = BTreeMap<String, BTreeMap<String, String>>;

/// Connector name → full status.
pub type ConnectorStatuses = BTreeMap<String, ConnectorStateInfo>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStateInfo {
    pub name: String,
    pub connector: ConnectorState,
    pub tasks: Vec<TaskState>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorState {
    pub state: String,
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    pub id: u32,
    pub state: String,
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// A result paired with whether the call created it or found it existing.
/// Produced by [`crate::rest::translate::created`] for forwarded writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created<T> {
    pub created: bool,
    pub result: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_info_wire_format() {
        let info = ConnectorStateInfo {
            name: "conn1".into(),
            connector: ConnectorState {
                state: "RUNNING".into(),
                worker_id: "http://worker-1:8083".into(),
                trace: None,
            },
            tasks: vec![TaskState {
                id: 0,
                state: "FAILED".into(),
                worker_id: "http://worker-1:8083".into(),
                trace: Some("boom".into()),
            }],
            connector_type: Some("sink".into()),
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "conn1",
                "connector": {"state": "RUNNING", "worker_id": "http://worker-1:8083"},
                "tasks": [{"id": 0, "state": "FAILED", "worker_id": "http://worker-1:8083", "trace": "boom"}],
                "type": "sink"
            })
        );
    }

    #[test]
    fn test_state_info_without_type() {
        let info: ConnectorStateInfo = serde_json::from_value(json!({
            "name": "conn2",
            "connector": {"state": "PAUSED", "worker_id": "w"},
            "tasks": []
        }))
        .unwrap();
        assert_eq!(info.connector_type, None);
        assert!(info.tasks.is_empty());
    }
}
