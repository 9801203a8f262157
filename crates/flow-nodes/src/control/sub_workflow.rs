//! Sub-Workflow Node
//!
//! Runs an embedded workflow graph in a child execution context. The
//! child context carries a depth one greater than its parent's, so the
//! engine's nesting guard bounds recursive compositions automatically.

use async_trait::async_trait;
use flow_engine::{
    ExecutionContext, FlowError, GraphNode, HandlerRegistry, NodeHandler, NodeResult, Result,
    RunStatus, WorkflowExecutor, WorkflowGraph,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Sub-Workflow Handler
///
/// # Configuration (`data`)
/// - `workflow` (required) - Embedded workflow graph (same shape as a
///   top-level graph)
/// - `input` (optional) - Trigger data for the child run; template
///   placeholders in it resolve against the PARENT context
///
/// # Output
/// The child run's summary (`status`, `executedCount`, `errorCount`,
/// `durationMs`). A child run ending in `error` status fails this node,
/// subject to the node's own error policy.
pub struct SubWorkflowHandler;

#[async_trait]
impl NodeHandler for SubWorkflowHandler {
    fn validate(&self, data: &Value) -> Option<String> {
        let Some(workflow) = data.get("workflow") else {
            return Some("missing 'workflow' graph".to_string());
        };
        match serde_json::from_value::<WorkflowGraph>(workflow.clone()) {
            Ok(_) => None,
            Err(e) => Some(format!("invalid 'workflow' graph: {}", e)),
        }
    }

    async fn execute(&self, node: &GraphNode, ctx: &mut ExecutionContext) -> Result<NodeResult> {
        let Some(workflow) = node.data.get("workflow") else {
            return Err(FlowError::MissingField("workflow".to_string()));
        };
        let graph: WorkflowGraph = serde_json::from_value(workflow.clone())
            .map_err(|e| FlowError::InvalidConfig(format!("invalid 'workflow' graph: {}", e)))?;

        let trigger = node
            .data
            .get("input")
            .map(|input| ctx.resolve_value(input))
            .unwrap_or(Value::Null);

        let mut child_ctx = ctx.child(Uuid::new_v4().to_string(), graph.id.clone(), trigger);

        log::debug!(
            "Node '{}' running sub-workflow '{}' at depth {}",
            node.id,
            graph.id,
            child_ctx.depth()
        );

        let registry = Arc::new(HandlerRegistry::with_builtins());
        let executor = WorkflowExecutor::new(graph, registry);
        let summary = executor.execute(&mut child_ctx).await;

        if summary.status == RunStatus::Error {
            return Ok(NodeResult::failure(format!(
                "sub-workflow failed: {} of {} nodes errored",
                summary.error_count, summary.executed_count
            )));
        }

        Ok(NodeResult::success(serde_json::to_value(&summary)?))
    }
}

inventory::submit!(flow_engine::HandlerRegistration {
    node_types: &["sub-workflow"],
    factory: || Box::new(SubWorkflowHandler),
});
