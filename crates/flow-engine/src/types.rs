//! Core types for workflow graphs
//!
//! These types define the structure of workflow graphs supplied by callers:
//! nodes, edges, and the per-node error-handling policy.

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// The default source handle, used when an edge does not name an
/// explicit output port.
pub const DEFAULT_HANDLE: &str = "default";

fn default_handle() -> String {
    DEFAULT_HANDLE.to_string()
}

/// Per-node error-handling policy, read from the node's `data` under
/// the `error_handling` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the entire run immediately
    #[default]
    Stop,
    /// Proceed downstream as if the node had succeeded
    Ignore,
    /// Store the node's `fallback_output` and proceed downstream
    Resume,
    /// Abandon this branch, but keep processing other queued branches
    Break,
}

impl ErrorPolicy {
    /// Parse a policy string, falling back to `Stop` for unknown values.
    pub fn parse(s: &str) -> Self {
        match s {
            "ignore" => ErrorPolicy::Ignore,
            "resume" => ErrorPolicy::Resume,
            "break" => ErrorPolicy::Break,
            _ => ErrorPolicy::Stop,
        }
    }
}

/// A node instance in a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Node type (selects the handler)
    pub node_type: String,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Free-form configuration consumed by the handler
    #[serde(default)]
    pub data: serde_json::Value,
}

impl GraphNode {
    /// Create a node with the given id and type.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            label: None,
            data: serde_json::Value::Null,
        }
    }

    /// Set the node's configuration data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// The error-handling policy declared in this node's data.
    ///
    /// Defaults to `Stop` when absent or unrecognized.
    pub fn error_policy(&self) -> ErrorPolicy {
        self.data
            .get("error_handling")
            .and_then(|v| v.as_str())
            .map(ErrorPolicy::parse)
            .unwrap_or_default()
    }

    /// The fallback output declared in this node's data, if any.
    ///
    /// Used by the `Resume` policy to stand in for a failed node's output.
    pub fn fallback_output(&self) -> Option<&serde_json::Value> {
        self.data.get("fallback_output")
    }
}

/// An edge connecting two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Source node ID
    pub source: NodeId,
    /// Named output port of the source node this edge is attached to
    #[serde(default = "default_handle")]
    pub source_handle: String,
    /// Target node ID
    pub target: NodeId,
}

impl GraphEdge {
    /// Create an edge on the default handle.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_handle: default_handle(),
            target: target.into(),
        }
    }

    /// Create an edge on a named handle.
    pub fn with_handle(
        source: impl Into<String>,
        handle: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: handle.into(),
            target: target.into(),
        }
    }
}

/// A complete workflow graph, immutable input to one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    /// Unique identifier for this graph
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Nodes in the graph, in declaration order
    pub nodes: Vec<GraphNode>,
    /// Edges connecting nodes
    pub edges: Vec<GraphEdge>,
}

impl WorkflowGraph {
    /// Create a new empty graph
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Nodes with no incoming edge, in declaration order.
    ///
    /// These are the roots that seed a run's traversal queue.
    pub fn start_nodes(&self) -> Vec<&GraphNode> {
        self.nodes
            .iter()
            .filter(|n| self.incoming_edges(&n.id).next().is_none())
            .collect()
    }
}
