//! Template Node
//!
//! Renders a `{{ }}` template string against the execution context and
//! outputs the rendered text.

use async_trait::async_trait;
use flow_engine::{ExecutionContext, GraphNode, NodeHandler, NodeResult, Result};
use serde_json::{json, Value};

/// Template Handler
///
/// # Configuration (`data`)
/// - `template` (required) - Template string; placeholders reference
///   variables, `$trigger` paths, and `$node.<id>` paths.
///
/// # Output
/// `{"text": <rendered string>}`. Unresolvable placeholders stay in the
/// rendered text verbatim.
pub struct TemplateHandler;

#[async_trait]
impl NodeHandler for TemplateHandler {
    fn validate(&self, data: &Value) -> Option<String> {
        match data.get("template") {
            Some(Value::String(_)) => None,
            Some(_) => Some("'template' must be a string".to_string()),
            None => Some("missing 'template' string".to_string()),
        }
    }

    async fn execute(&self, node: &GraphNode, ctx: &mut ExecutionContext) -> Result<NodeResult> {
        let Some(template) = node.data.get("template").and_then(|v| v.as_str()) else {
            return Ok(NodeResult::failure("missing 'template' string"));
        };

        let rendered = ctx.resolve_template(template);
        log::debug!("Node '{}' rendered {} chars", node.id, rendered.len());

        Ok(NodeResult::success(json!({"text": rendered})))
    }
}

inventory::submit!(flow_engine::HandlerRegistration {
    node_types: &["template"],
    factory: || Box::new(TemplateHandler),
});

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_against_context() {
        let handler = TemplateHandler;
        let node = GraphNode::new("t", "template")
            .with_data(json!({"template": "Order {{$trigger.order.id}} for {{customer}}"}));
        let mut ctx = ExecutionContext::new("exec", "wf", json!({"order": {"id": 991}}));
        ctx.set_variable("customer", json!("Grace"));

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(result.output, Some(json!({"text": "Order 991 for Grace"})));
    }

    #[tokio::test]
    async fn test_unresolved_placeholder_left_verbatim() {
        let handler = TemplateHandler;
        let node =
            GraphNode::new("t", "template").with_data(json!({"template": "hi {{missing}}"}));
        let mut ctx = ExecutionContext::new("exec", "wf", Value::Null);

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(result.output, Some(json!({"text": "hi {{missing}}"})));
    }

    #[test]
    fn test_validate_requires_template() {
        let handler = TemplateHandler;
        assert!(handler.validate(&json!({})).is_some());
        assert!(handler.validate(&json!({"template": 5})).is_some());
        assert!(handler.validate(&json!({"template": "ok"})).is_none());
    }
}
