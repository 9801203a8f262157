//! Execution-log store interface
//!
//! For every node execution the engine writes one structured record through
//! this collaborator so operators retain full post-hoc visibility, even for
//! failures a node's error policy absorbed. The schema of the backing store
//! is outside the engine; this module only defines the record shape and the
//! trait, plus in-memory implementations for tests and embedding.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Per-node outcome as recorded in the execution log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// The handler ran to completion
    Success,
    /// Validation or execution failed
    Failed,
    /// No handler registered for the node's type
    Skipped,
}

/// One execution-log record, written after every node execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionRecord {
    /// Run this record belongs to
    pub execution_id: String,
    /// Node id within the graph
    pub node_id: String,
    /// Node type string
    pub node_type: String,
    /// Human-readable node label, if the graph supplied one
    pub label: Option<String>,
    /// Outcome of the execution
    pub status: NodeStatus,
    /// The node's input configuration as dispatched
    pub input: serde_json::Value,
    /// Output payload, if any
    pub output: Option<serde_json::Value>,
    /// Error message for failed executions
    pub error: Option<String>,
    /// Wall-clock execution time in milliseconds
    pub duration_ms: u64,
}

/// Error when writing an execution-log record fails
#[derive(Debug, Clone)]
pub struct StoreError {
    pub message: String,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Store error: {}", self.message)
    }
}

impl std::error::Error for StoreError {}

/// Trait for persisting per-node execution records
///
/// Writes are best-effort from the engine's point of view: a failing store
/// is logged, never surfaced as a run error.
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
    /// Persist one record
    async fn record(&self, record: NodeExecutionRecord) -> Result<(), StoreError>;
}

/// A no-op store that discards all records
pub struct NullLogStore;

#[async_trait]
impl ExecutionLogStore for NullLogStore {
    async fn record(&self, _record: NodeExecutionRecord) -> Result<(), StoreError> {
        Ok(())
    }
}

/// An in-memory store that collects records
///
/// Useful for testing to verify what the engine persisted.
pub struct MemoryLogStore {
    records: std::sync::Mutex<Vec<NodeExecutionRecord>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected records
    pub fn records(&self) -> Vec<NodeExecutionRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutionLogStore for MemoryLogStore {
    async fn record(&self, record: NodeExecutionRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_collects_records() {
        let store = MemoryLogStore::new();

        store
            .record(NodeExecutionRecord {
                execution_id: "exec-1".to_string(),
                node_id: "n1".to_string(),
                node_type: "condition".to_string(),
                label: Some("Check".to_string()),
                status: NodeStatus::Success,
                input: serde_json::json!({"left": "1"}),
                output: Some(serde_json::json!({"matched": true})),
                error: None,
                duration_ms: 3,
            })
            .await
            .unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].node_id, "n1");
        assert_eq!(records[0].status, NodeStatus::Success);
    }

    #[test]
    fn test_record_serialization() {
        let record = NodeExecutionRecord {
            execution_id: "exec-1".to_string(),
            node_id: "n1".to_string(),
            node_type: "template".to_string(),
            label: None,
            status: NodeStatus::Skipped,
            input: serde_json::Value::Null,
            output: None,
            error: None,
            duration_ms: 0,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["nodeType"], "template"); // camelCase
    }
}
