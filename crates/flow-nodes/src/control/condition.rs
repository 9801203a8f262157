//! Condition Node
//!
//! Compares two template-resolved values and routes the traversal to
//! the `true` or `false` output handle. This is the branching primitive:
//! wire edges with `sourceHandle: "true"` / `"false"` from this node.

use async_trait::async_trait;
use flow_engine::{ExecutionContext, GraphNode, NodeHandler, NodeResult, Result};
use serde_json::{json, Value};

/// Condition Handler
///
/// # Configuration (`data`)
/// - `left` (required) - Left operand; may contain `{{ }}` placeholders
/// - `operator` (required) - One of `eq`, `ne`, `gt`, `lt`, `contains`
/// - `right` (optional) - Right operand; may contain placeholders;
///   defaults to the empty string
///
/// `gt`/`lt` compare numerically when both operands parse as numbers,
/// otherwise lexicographically.
///
/// # Output
/// `{"matched": bool, "left": ..., "right": ...}`, routed via the
/// `true` or `false` handle.
pub struct ConditionHandler;

const OPERATORS: &[&str] = &["eq", "ne", "gt", "lt", "contains"];

impl ConditionHandler {
    fn evaluate(left: &str, operator: &str, right: &str) -> bool {
        match operator {
            "eq" => left == right,
            "ne" => left != right,
            "gt" | "lt" => {
                let ordering = match (left.parse::<f64>(), right.parse::<f64>()) {
                    (Ok(l), Ok(r)) => l.partial_cmp(&r),
                    _ => Some(left.cmp(right)),
                };
                match operator {
                    "gt" => ordering == Some(std::cmp::Ordering::Greater),
                    _ => ordering == Some(std::cmp::Ordering::Less),
                }
            }
            "contains" => left.contains(right),
            _ => false,
        }
    }
}

#[async_trait]
impl NodeHandler for ConditionHandler {
    fn validate(&self, data: &Value) -> Option<String> {
        if data.get("left").and_then(|v| v.as_str()).is_none() {
            return Some("missing 'left' operand".to_string());
        }
        match data.get("operator").and_then(|v| v.as_str()) {
            None => Some("missing 'operator'".to_string()),
            Some(op) if !OPERATORS.contains(&op) => {
                Some(format!("unknown operator '{}'", op))
            }
            Some(_) => None,
        }
    }

    async fn execute(&self, node: &GraphNode, ctx: &mut ExecutionContext) -> Result<NodeResult> {
        let left_raw = node.data.get("left").and_then(|v| v.as_str()).unwrap_or("");
        let operator = node
            .data
            .get("operator")
            .and_then(|v| v.as_str())
            .unwrap_or("eq");
        let right_raw = node.data.get("right").and_then(|v| v.as_str()).unwrap_or("");

        let left = ctx.resolve_template(left_raw);
        let right = ctx.resolve_template(right_raw);
        let matched = Self::evaluate(&left, operator, &right);

        log::debug!(
            "Condition node '{}': '{}' {} '{}' => {}",
            node.id,
            left,
            operator,
            right,
            matched
        );

        let handle = if matched { "true" } else { "false" };
        Ok(
            NodeResult::success(json!({"matched": matched, "left": left, "right": right}))
                .with_handle(handle),
        )
    }
}

inventory::submit!(flow_engine::HandlerRegistration {
    node_types: &["condition"],
    factory: || Box::new(ConditionHandler),
});

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ExecutionContext {
        ExecutionContext::new("exec", "wf", Value::Null)
    }

    #[tokio::test]
    async fn test_eq_routes_true_handle() {
        let handler = ConditionHandler;
        let node = GraphNode::new("c", "condition")
            .with_data(json!({"left": "a", "operator": "eq", "right": "a"}));

        let result = handler.execute(&node, &mut ctx()).await.unwrap();
        assert_eq!(result.source_handle, "true");
        assert_eq!(result.output.as_ref().unwrap()["matched"], json!(true));
    }

    #[tokio::test]
    async fn test_ne_routes_false_handle_when_equal() {
        let handler = ConditionHandler;
        let node = GraphNode::new("c", "condition")
            .with_data(json!({"left": "a", "operator": "ne", "right": "a"}));

        let result = handler.execute(&node, &mut ctx()).await.unwrap();
        assert_eq!(result.source_handle, "false");
    }

    #[tokio::test]
    async fn test_gt_compares_numerically() {
        let handler = ConditionHandler;
        // Lexicographic compare would say "9" > "10"; numeric must not
        let node = GraphNode::new("c", "condition")
            .with_data(json!({"left": "9", "operator": "gt", "right": "10"}));

        let result = handler.execute(&node, &mut ctx()).await.unwrap();
        assert_eq!(result.source_handle, "false");
    }

    #[tokio::test]
    async fn test_lt_falls_back_to_string_ordering() {
        let handler = ConditionHandler;
        let node = GraphNode::new("c", "condition")
            .with_data(json!({"left": "apple", "operator": "lt", "right": "banana"}));

        let result = handler.execute(&node, &mut ctx()).await.unwrap();
        assert_eq!(result.source_handle, "true");
    }

    #[tokio::test]
    async fn test_contains() {
        let handler = ConditionHandler;
        let node = GraphNode::new("c", "condition")
            .with_data(json!({"left": "workflow engine", "operator": "contains", "right": "flow"}));

        let result = handler.execute(&node, &mut ctx()).await.unwrap();
        assert_eq!(result.source_handle, "true");
    }

    #[tokio::test]
    async fn test_operands_are_template_resolved() {
        let handler = ConditionHandler;
        let node = GraphNode::new("c", "condition").with_data(
            json!({"left": "{{$trigger.status}}", "operator": "eq", "right": "ready"}),
        );
        let mut ctx = ExecutionContext::new("exec", "wf", json!({"status": "ready"}));

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(result.source_handle, "true");
    }

    #[test]
    fn test_validate() {
        let handler = ConditionHandler;
        assert!(handler.validate(&json!({})).is_some());
        assert!(handler.validate(&json!({"left": "x"})).is_some());
        assert!(handler
            .validate(&json!({"left": "x", "operator": "between"}))
            .is_some());
        assert!(handler
            .validate(&json!({"left": "x", "operator": "eq"}))
            .is_none());
    }
}
