//! Set Variable Node
//!
//! Writes one or more named variables into the execution context.
//! Values are template-resolved before being stored, so a variable can
//! capture trigger data or an upstream node's output.

use async_trait::async_trait;
use flow_engine::{ExecutionContext, GraphNode, NodeHandler, NodeResult, Result};
use serde_json::Value;

/// Set Variable Handler
///
/// # Configuration (`data`)
/// - `variables` (required) - Object mapping variable names to values.
///   String values (and strings nested in objects/arrays) may contain
///   `{{ }}` placeholders.
///
/// Produces no output; its effect is entirely on the context.
pub struct SetVariableHandler;

#[async_trait]
impl NodeHandler for SetVariableHandler {
    fn validate(&self, data: &Value) -> Option<String> {
        match data.get("variables") {
            Some(Value::Object(_)) => None,
            Some(_) => Some("'variables' must be an object".to_string()),
            None => Some("missing 'variables' object".to_string()),
        }
    }

    async fn execute(&self, node: &GraphNode, ctx: &mut ExecutionContext) -> Result<NodeResult> {
        let Some(variables) = node.data.get("variables").and_then(|v| v.as_object()) else {
            return Ok(NodeResult::failure("missing 'variables' object"));
        };

        // Resolve everything first: a variable set in this node must not be
        // visible to placeholders in its sibling values
        let resolved: Vec<(String, Value)> = variables
            .iter()
            .map(|(name, value)| (name.clone(), ctx.resolve_value(value)))
            .collect();

        for (name, value) in resolved {
            log::debug!("Node '{}' setting variable '{}'", node.id, name);
            ctx.set_variable(name, value);
        }

        Ok(NodeResult::empty())
    }
}

inventory::submit!(flow_engine::HandlerRegistration {
    node_types: &["set-variable"],
    factory: || Box::new(SetVariableHandler),
});

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sets_variables() {
        let handler = SetVariableHandler;
        let node = GraphNode::new("sv", "set-variable")
            .with_data(json!({"variables": {"greeting": "hello", "count": 3}}));
        let mut ctx = ExecutionContext::new("exec", "wf", Value::Null);

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert!(!result.is_failure());
        assert!(result.output.is_none());
        assert_eq!(ctx.get_variable("greeting"), Some(&json!("hello")));
        assert_eq!(ctx.get_variable("count"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_values_are_template_resolved() {
        let handler = SetVariableHandler;
        let node = GraphNode::new("sv", "set-variable")
            .with_data(json!({"variables": {"who": "user {{$trigger.name}}"}}));
        let mut ctx = ExecutionContext::new("exec", "wf", json!({"name": "ada"}));

        handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(ctx.get_variable("who"), Some(&json!("user ada")));
    }

    #[test]
    fn test_validate_requires_variables_object() {
        let handler = SetVariableHandler;
        assert!(handler.validate(&json!({})).is_some());
        assert!(handler.validate(&json!({"variables": "nope"})).is_some());
        assert!(handler.validate(&json!({"variables": {}})).is_none());
    }
}
