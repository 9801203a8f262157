//! Event types for streaming run progress
//!
//! Events are published from the engine to a named per-run channel for any
//! external observer (e.g. a live status UI). Delivery is best-effort: the
//! executor logs and swallows publish failures rather than surfacing them
//! as run errors.

use serde::{Deserialize, Serialize};

use crate::result::RunStatus;

/// Trait for publishing workflow events
///
/// This abstracts over the transport mechanism (pub/sub broker, mpsc, etc.)
/// allowing the engine to be used in different contexts.
pub trait EventSink: Send + Sync {
    /// Publish an event
    ///
    /// Returns an error if the event could not be published (e.g. channel
    /// closed); the executor treats this as non-fatal.
    fn send(&self, event: WorkflowEvent) -> Result<(), EventError>;
}

/// Error when publishing events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Events emitted during a workflow run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkflowEvent {
    /// A run started
    #[serde(rename_all = "camelCase")]
    RunStarted {
        workflow_id: String,
        execution_id: String,
    },

    /// A node started executing
    #[serde(rename_all = "camelCase")]
    NodeStarted {
        execution_id: String,
        node_id: String,
        node_type: String,
    },

    /// A node completed (including skipped nodes)
    #[serde(rename_all = "camelCase")]
    NodeCompleted {
        execution_id: String,
        node_id: String,
        duration_ms: u64,
        output: Option<serde_json::Value>,
    },

    /// A node failed
    #[serde(rename_all = "camelCase")]
    NodeFailed {
        execution_id: String,
        node_id: String,
        duration_ms: u64,
        error: String,
    },

    /// The run finished
    #[serde(rename_all = "camelCase")]
    RunCompleted {
        workflow_id: String,
        execution_id: String,
        status: RunStatus,
        executed_count: u32,
        error_count: u32,
    },
}

impl WorkflowEvent {
    /// The name of the per-run channel observers subscribe to.
    pub fn channel(execution_id: &str) -> String {
        format!("workflow_execution:{}", execution_id)
    }
}

/// A no-op event sink that discards all events
///
/// Useful for testing or when events aren't needed.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: WorkflowEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<WorkflowEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: WorkflowEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
