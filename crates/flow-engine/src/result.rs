//! Node and run outcome types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::DEFAULT_HANDLE;

/// The outcome of one node execution, returned by a handler.
///
/// `error` being present means the node failed. `output` may be absent on
/// success for side-effect-only nodes (e.g. "set variable"). Routing follows
/// `source_handles` when non-empty, otherwise the single `source_handle`.
#[derive(Debug, Clone)]
pub struct NodeResult {
    /// Output payload stored into the context on success
    pub output: Option<Value>,
    /// Failure message; present ⇔ the node failed
    pub error: Option<String>,
    /// Single routing choice (named output port)
    pub source_handle: String,
    /// Fan-out routing choices; takes precedence over `source_handle`
    pub source_handles: Vec<String>,
    /// Free-form diagnostic info
    pub metadata: Map<String, Value>,
}

impl NodeResult {
    /// A successful result with an output payload.
    pub fn success(output: Value) -> Self {
        Self {
            output: Some(output),
            error: None,
            source_handle: DEFAULT_HANDLE.to_string(),
            source_handles: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// A successful result with no output (side-effect-only nodes).
    pub fn empty() -> Self {
        Self {
            output: None,
            error: None,
            source_handle: DEFAULT_HANDLE.to_string(),
            source_handles: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// A failed result carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            output: None,
            error: Some(error.into()),
            source_handle: DEFAULT_HANDLE.to_string(),
            source_handles: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Route downstream via a single named handle.
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = handle.into();
        self
    }

    /// Fan out downstream via several named handles.
    pub fn with_handles(mut self, handles: Vec<String>) -> Self {
        self.source_handles = handles;
        self
    }

    /// Attach a diagnostic metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether this result represents a failed node.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// The handles to follow downstream from this result.
    pub fn routing_handles(&self) -> Vec<&str> {
        if self.source_handles.is_empty() {
            vec![self.source_handle.as_str()]
        } else {
            self.source_handles.iter().map(|h| h.as_str()).collect()
        }
    }
}

/// Overall status of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every dispatched node succeeded
    Completed,
    /// Some nodes failed, but no `stop` policy fired
    CompletedWithErrors,
    /// The run was aborted (stop policy, structural failure, or depth guard)
    Error,
}

/// Summary returned to the caller when a run finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Overall run status
    pub status: RunStatus,
    /// Number of nodes whose handler was actually dispatched
    pub executed_count: u32,
    /// Number of nodes that failed
    pub error_count: u32,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_defaults() {
        let result = NodeResult::success(json!({"v": 1}));
        assert!(!result.is_failure());
        assert_eq!(result.source_handle, DEFAULT_HANDLE);
        assert_eq!(result.routing_handles(), vec![DEFAULT_HANDLE]);
    }

    #[test]
    fn test_empty_success() {
        let result = NodeResult::empty();
        assert!(!result.is_failure());
        assert!(result.output.is_none());
    }

    #[test]
    fn test_failure() {
        let result = NodeResult::failure("boom");
        assert!(result.is_failure());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_handles_precedence() {
        let result = NodeResult::success(json!(null))
            .with_handle("true")
            .with_handles(vec!["a".to_string(), "b".to_string()]);

        // source_handles wins when non-empty
        assert_eq!(result.routing_handles(), vec!["a", "b"]);
    }

    #[test]
    fn test_run_status_serialization() {
        assert_eq!(
            serde_json::to_value(RunStatus::CompletedWithErrors).unwrap(),
            json!("completed_with_errors")
        );
        assert_eq!(serde_json::to_value(RunStatus::Error).unwrap(), json!("error"));
    }
}
