//! Graph-based workflow execution engine
//!
//! This crate provides the core workflow execution infrastructure for
//! Flowline:
//! - Workflow graph types ([`WorkflowGraph`], [`GraphNode`], [`GraphEdge`])
//! - Execution state shared across a run ([`ExecutionContext`]) with
//!   `{{ }}` template resolution over trigger data, variables, and node
//!   outputs
//! - The handler contract ([`NodeHandler`]) and the directory that resolves
//!   node types to handlers ([`HandlerRegistry`])
//! - The breadth-first, visit-once executor ([`WorkflowExecutor`]) with
//!   per-node error policies and source-handle routing
//! - Collaborator traits for progress events ([`EventSink`]) and the
//!   execution log ([`ExecutionLogStore`])
//!
//! Concrete node handlers live in the companion `flow-nodes` crate; the
//! engine itself ships none and treats unknown node types as skippable.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use flow_engine::{ExecutionContext, HandlerRegistry, WorkflowExecutor, WorkflowGraph};
//!
//! let graph: WorkflowGraph = serde_json::from_str(graph_json)?;
//! let registry = Arc::new(HandlerRegistry::with_builtins());
//! let executor = WorkflowExecutor::new(graph, registry);
//!
//! let mut ctx = ExecutionContext::for_workflow(
//!     "my-workflow",
//!     serde_json::json!({"source": "manual"}),
//! );
//! let summary = executor.execute(&mut ctx).await;
//! ```

pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod handler;
pub mod registry;
pub mod result;
pub mod store;
pub mod types;

pub use context::{ExecutionContext, MAX_DEPTH};
pub use error::{FlowError, Result};
pub use events::{EventError, EventSink, NullEventSink, VecEventSink, WorkflowEvent};
pub use executor::WorkflowExecutor;
pub use handler::{HandlerRegistration, NodeHandler};
pub use registry::{HandlerFactory, HandlerRegistry};
pub use result::{NodeResult, RunStatus, RunSummary};
pub use store::{
    ExecutionLogStore, MemoryLogStore, NodeExecutionRecord, NodeStatus, NullLogStore, StoreError,
};
pub use types::{ErrorPolicy, GraphEdge, GraphNode, NodeId, WorkflowGraph, DEFAULT_HANDLE};

// Re-export inventory so handler crates registering via
// `HandlerRegistration` don't need their own direct dependency version.
pub use inventory;
