//! Workflow executor
//!
//! Runs one workflow graph to completion against one execution context:
//! breadth-first dispatch through the handler registry, per-node error
//! policy, output propagation into the context, and best-effort progress
//! events plus execution-log records for every node.
//!
//! The traversal is join-less and visit-once: a node executes the first
//! time any predecessor's frontier reaches it, and never again within the
//! same run. This guarantees termination on cyclic graphs at the cost of
//! not supporting repeated visits (loop constructs) within a single run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use crate::context::{ExecutionContext, MAX_DEPTH};
use crate::events::{EventSink, NullEventSink, WorkflowEvent};
use crate::registry::HandlerRegistry;
use crate::result::{NodeResult, RunStatus, RunSummary};
use crate::store::{ExecutionLogStore, NodeExecutionRecord, NodeStatus, NullLogStore};
use crate::types::{ErrorPolicy, GraphNode, NodeId, WorkflowGraph, DEFAULT_HANDLE};

/// Executes one workflow graph against one execution context.
pub struct WorkflowExecutor {
    /// The graph being run
    graph: WorkflowGraph,
    /// Outgoing edges keyed by source node id, as (target, handle) pairs
    adjacency: HashMap<NodeId, Vec<(NodeId, String)>>,
    /// Handler directory, injected by the host
    registry: Arc<HandlerRegistry>,
    /// Progress event collaborator
    event_sink: Arc<dyn EventSink>,
    /// Execution-log collaborator
    log_store: Arc<dyn ExecutionLogStore>,
}

impl WorkflowExecutor {
    /// Create an executor for one graph.
    ///
    /// Precomputes the adjacency structure so downstream lookups during the
    /// traversal are O(1) amortized instead of O(edges) per step.
    pub fn new(graph: WorkflowGraph, registry: Arc<HandlerRegistry>) -> Self {
        let mut adjacency: HashMap<NodeId, Vec<(NodeId, String)>> = HashMap::new();
        for edge in &graph.edges {
            adjacency
                .entry(edge.source.clone())
                .or_default()
                .push((edge.target.clone(), edge.source_handle.clone()));
        }

        Self {
            graph,
            adjacency,
            registry,
            event_sink: Arc::new(NullEventSink),
            log_store: Arc::new(NullLogStore),
        }
    }

    /// Set the progress event sink.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Set the execution-log store.
    pub fn with_log_store(mut self, store: Arc<dyn ExecutionLogStore>) -> Self {
        self.log_store = store;
        self
    }

    /// Run the graph to completion.
    ///
    /// Returns a [`RunSummary`]; per-node failure detail is only observable
    /// through the log store and the event sink, never through the return
    /// value.
    pub async fn execute(&self, ctx: &mut ExecutionContext) -> RunSummary {
        let run_started = Instant::now();

        self.emit(WorkflowEvent::RunStarted {
            workflow_id: ctx.workflow_id().to_string(),
            execution_id: ctx.execution_id().to_string(),
        });

        if ctx.depth() > MAX_DEPTH {
            log::warn!(
                "Refusing to run workflow '{}': sub-workflow depth {} exceeds limit {}",
                ctx.workflow_id(),
                ctx.depth(),
                MAX_DEPTH
            );
            return self.finish(ctx, RunStatus::Error, 0, 0, run_started);
        }

        let mut queue: VecDeque<NodeId> = self
            .graph
            .start_nodes()
            .iter()
            .map(|n| n.id.clone())
            .collect();

        if queue.is_empty() {
            match self.graph.nodes.first() {
                Some(first) => {
                    // Best-effort default for graphs with no free entry point
                    log::warn!(
                        "Workflow '{}' has no node without incoming edges; starting from first declared node '{}'",
                        ctx.workflow_id(),
                        first.id
                    );
                    queue.push_back(first.id.clone());
                }
                None => {
                    log::error!("Workflow '{}' has no nodes", ctx.workflow_id());
                    return self.finish(ctx, RunStatus::Error, 0, 0, run_started);
                }
            }
        }

        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut executed: u32 = 0;
        let mut errored: u32 = 0;
        let mut aborted = false;

        while let Some(node_id) = queue.pop_front() {
            if !visited.insert(node_id.clone()) {
                continue;
            }

            let Some(node) = self.graph.find_node(&node_id) else {
                log::warn!("Edge references unknown node '{}'; skipping", node_id);
                continue;
            };

            self.emit(WorkflowEvent::NodeStarted {
                execution_id: ctx.execution_id().to_string(),
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            });

            let node_started = Instant::now();
            let (result, status) = self.run_node(node, ctx).await;
            let duration_ms = node_started.elapsed().as_millis() as u64;

            match status {
                NodeStatus::Success => executed += 1,
                NodeStatus::Failed => {
                    executed += 1;
                    errored += 1;
                }
                NodeStatus::Skipped => {}
            }

            self.persist_record(ctx, node, &result, status, duration_ms).await;

            if let Some(error) = &result.error {
                self.emit(WorkflowEvent::NodeFailed {
                    execution_id: ctx.execution_id().to_string(),
                    node_id: node.id.clone(),
                    duration_ms,
                    error: error.clone(),
                });

                match node.error_policy() {
                    ErrorPolicy::Stop => {
                        log::error!(
                            "Node '{}' failed with stop policy, aborting run: {}",
                            node.id,
                            error
                        );
                        aborted = true;
                        break;
                    }
                    ErrorPolicy::Ignore => {
                        self.enqueue_frontier(&node_id, &[DEFAULT_HANDLE], &visited, &mut queue);
                    }
                    ErrorPolicy::Resume => {
                        if let Some(fallback) = node.fallback_output() {
                            ctx.store_node_output(&node.id, fallback.clone());
                        }
                        self.enqueue_frontier(&node_id, &[DEFAULT_HANDLE], &visited, &mut queue);
                    }
                    ErrorPolicy::Break => {
                        log::debug!("Node '{}' failed with break policy, abandoning branch", node.id);
                    }
                }
            } else {
                self.emit(WorkflowEvent::NodeCompleted {
                    execution_id: ctx.execution_id().to_string(),
                    node_id: node.id.clone(),
                    duration_ms,
                    output: result.output.clone(),
                });

                // Store the output before computing the frontier, so later
                // nodes and the template resolver can already see it
                if let Some(output) = &result.output {
                    ctx.store_node_output(&node.id, output.clone());
                }

                let handles = result.routing_handles();
                self.enqueue_frontier(&node_id, &handles, &visited, &mut queue);
            }
        }

        let status = if aborted {
            RunStatus::Error
        } else if errored > 0 {
            RunStatus::CompletedWithErrors
        } else {
            RunStatus::Completed
        };

        self.finish(ctx, status, executed, errored, run_started)
    }

    /// Execute one node: handler lookup, validation, execution, and
    /// normalization of handler errors into the `NodeResult` failure channel.
    async fn run_node(
        &self,
        node: &GraphNode,
        ctx: &mut ExecutionContext,
    ) -> (NodeResult, NodeStatus) {
        let Some(handler) = self.registry.get_handler(&node.node_type) else {
            // Unknown node types degrade gracefully instead of failing the run
            log::warn!(
                "No handler registered for node type '{}' (node '{}'); skipping",
                node.node_type,
                node.id
            );
            let result = NodeResult::success(serde_json::json!({
                "skipped": true,
                "reason": format!("no handler registered for node type '{}'", node.node_type),
            }));
            return (result, NodeStatus::Skipped);
        };

        if let Some(message) = handler.validate(&node.data) {
            return (
                NodeResult::failure(format!("Validation failed: {}", message)),
                NodeStatus::Failed,
            );
        }

        match handler.execute(node, ctx).await {
            Ok(result) => {
                let status = if result.is_failure() {
                    NodeStatus::Failed
                } else {
                    NodeStatus::Success
                };
                (result, status)
            }
            // A misbehaving handler must not crash the run
            Err(e) => (NodeResult::failure(e.to_string()), NodeStatus::Failed),
        }
    }

    /// Enqueue not-yet-visited downstream nodes reachable via the given
    /// handles.
    ///
    /// For each handle with no matching edge at all, edges tagged
    /// `"default"` serve as a last-resort escape path.
    fn enqueue_frontier(
        &self,
        node_id: &str,
        handles: &[&str],
        visited: &HashSet<NodeId>,
        queue: &mut VecDeque<NodeId>,
    ) {
        let Some(edges) = self.adjacency.get(node_id) else {
            return;
        };

        for handle in handles {
            let mut matched = false;
            for (target, edge_handle) in edges {
                if edge_handle == handle {
                    matched = true;
                    if !visited.contains(target) {
                        queue.push_back(target.clone());
                    }
                }
            }
            if !matched && *handle != DEFAULT_HANDLE {
                for (target, edge_handle) in edges {
                    if edge_handle == DEFAULT_HANDLE && !visited.contains(target) {
                        queue.push_back(target.clone());
                    }
                }
            }
        }
    }

    /// Write one execution-log record; failures are logged, never fatal.
    async fn persist_record(
        &self,
        ctx: &ExecutionContext,
        node: &GraphNode,
        result: &NodeResult,
        status: NodeStatus,
        duration_ms: u64,
    ) {
        let record = NodeExecutionRecord {
            execution_id: ctx.execution_id().to_string(),
            node_id: node.id.clone(),
            node_type: node.node_type.clone(),
            label: node.label.clone(),
            status,
            input: node.data.clone(),
            output: result.output.clone(),
            error: result.error.clone(),
            duration_ms,
        };

        if let Err(e) = self.log_store.record(record).await {
            log::warn!(
                "Failed to persist execution log for node '{}': {}",
                node.id,
                e
            );
        }
    }

    /// Emit the run-completed event and build the summary.
    fn finish(
        &self,
        ctx: &ExecutionContext,
        status: RunStatus,
        executed_count: u32,
        error_count: u32,
        run_started: Instant,
    ) -> RunSummary {
        self.emit(WorkflowEvent::RunCompleted {
            workflow_id: ctx.workflow_id().to_string(),
            execution_id: ctx.execution_id().to_string(),
            status,
            executed_count,
            error_count,
        });

        RunSummary {
            status,
            executed_count,
            error_count,
            duration_ms: run_started.elapsed().as_millis() as u64,
        }
    }

    /// Publish one event; failures are logged, never fatal.
    fn emit(&self, event: WorkflowEvent) {
        if let Err(e) = self.event_sink.send(event) {
            log::warn!("Failed to publish workflow event: {}", e);
        }
    }
}
