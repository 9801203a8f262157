//! Trigger Node
//!
//! Entry point of a workflow: republishes the run's trigger data as its
//! output so downstream nodes can reference it as a node output in
//! addition to `$trigger` paths.

use async_trait::async_trait;
use flow_engine::{ExecutionContext, GraphNode, NodeHandler, NodeResult, Result};
use serde_json::Value;

/// Trigger Handler
///
/// Registered under `trigger`, `manual-trigger`, and `webhook-trigger`;
/// all three behave identically inside the engine, the distinct names
/// exist so graphs can record how a run was initiated.
///
/// # Output
/// The run's trigger data, verbatim. A `null` trigger becomes an empty
/// object so downstream path lookups have something to traverse.
pub struct TriggerHandler;

#[async_trait]
impl NodeHandler for TriggerHandler {
    async fn execute(&self, node: &GraphNode, ctx: &mut ExecutionContext) -> Result<NodeResult> {
        log::debug!("Trigger node '{}' publishing trigger data", node.id);

        let output = match ctx.trigger_data() {
            Value::Null => serde_json::json!({}),
            other => other.clone(),
        };
        Ok(NodeResult::success(output))
    }
}

inventory::submit!(flow_engine::HandlerRegistration {
    node_types: &["trigger", "manual-trigger", "webhook-trigger"],
    factory: || Box::new(TriggerHandler),
});

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_outputs_trigger_data() {
        let handler = TriggerHandler;
        let node = GraphNode::new("t1", "trigger");
        let mut ctx = ExecutionContext::new("exec", "wf", json!({"source": "manual", "id": 7}));

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(result.output, Some(json!({"source": "manual", "id": 7})));
        assert!(!result.is_failure());
    }

    #[tokio::test]
    async fn test_null_trigger_becomes_empty_object() {
        let handler = TriggerHandler;
        let node = GraphNode::new("t1", "webhook-trigger");
        let mut ctx = ExecutionContext::new("exec", "wf", Value::Null);

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(result.output, Some(json!({})));
    }
}
