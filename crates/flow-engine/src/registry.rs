//! Handler registry
//!
//! Maps node-type strings to handler factories. The registry is an explicit
//! object constructed once at startup and passed by reference (via `Arc`)
//! into each executor, rather than implicit global state — this keeps tests
//! isolated and makes overrides visible at the call site.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::{HandlerRegistration, NodeHandler};

/// Factory for creating fresh handler instances.
///
/// Handlers are stateless, so the registry never caches instances; every
/// lookup goes through a factory.
pub trait HandlerFactory: Send + Sync {
    fn create(&self) -> Box<dyn NodeHandler>;
}

/// Factory wrapping a plain function or closure.
struct FnFactory<F: Fn() -> Box<dyn NodeHandler> + Send + Sync>(F);

impl<F: Fn() -> Box<dyn NodeHandler> + Send + Sync> HandlerFactory for FnFactory<F> {
    fn create(&self) -> Box<dyn NodeHandler> {
        (self.0)()
    }
}

/// Directory from node-type string to handler factory.
pub struct HandlerRegistry {
    factories: HashMap<String, Arc<dyn HandlerFactory>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry preloaded with every link-time
    /// [`HandlerRegistration`](crate::HandlerRegistration).
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<HandlerRegistration> {
            registry.register(registration.node_types, registration.factory);
        }
        registry
    }

    /// Register a factory under one or more type identifiers.
    ///
    /// Re-registering an identifier overwrites the previous association and
    /// logs a warning — last registration wins. This permits overriding for
    /// tests without crashing, but an unexpected overwrite is something the
    /// operator should notice in logs.
    pub fn register(
        &mut self,
        node_types: &[&str],
        factory: impl Fn() -> Box<dyn NodeHandler> + Send + Sync + 'static,
    ) {
        let factory: Arc<dyn HandlerFactory> = Arc::new(FnFactory(factory));
        for node_type in node_types {
            if self
                .factories
                .insert(node_type.to_string(), factory.clone())
                .is_some()
            {
                log::warn!(
                    "Handler for node type '{}' re-registered; previous handler replaced",
                    node_type
                );
            }
        }
    }

    /// Get a fresh handler instance for a node type.
    pub fn get_handler(&self, node_type: &str) -> Option<Box<dyn NodeHandler>> {
        self.factories.get(node_type).map(|f| f.create())
    }

    /// Check whether a node type is registered.
    pub fn has_handler(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// List all registered node types, sorted.
    pub fn node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ExecutionContext;
    use crate::error::Result;
    use crate::result::NodeResult;
    use crate::types::GraphNode;
    use async_trait::async_trait;

    struct EchoHandler;

    #[async_trait]
    impl NodeHandler for EchoHandler {
        async fn execute(
            &self,
            node: &GraphNode,
            _ctx: &mut ExecutionContext,
        ) -> Result<NodeResult> {
            Ok(NodeResult::success(node.data.clone()))
        }
    }

    struct OtherHandler;

    #[async_trait]
    impl NodeHandler for OtherHandler {
        async fn execute(
            &self,
            _node: &GraphNode,
            _ctx: &mut ExecutionContext,
        ) -> Result<NodeResult> {
            Ok(NodeResult::empty())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        registry.register(&["echo"], || Box::new(EchoHandler));

        assert!(registry.has_handler("echo"));
        assert!(!registry.has_handler("unknown"));
        assert!(registry.get_handler("echo").is_some());
        assert!(registry.get_handler("unknown").is_none());
    }

    #[test]
    fn test_aliases_share_one_factory() {
        let mut registry = HandlerRegistry::new();
        registry.register(&["trigger", "manual-trigger"], || Box::new(EchoHandler));

        assert!(registry.has_handler("trigger"));
        assert!(registry.has_handler("manual-trigger"));
    }

    #[test]
    fn test_reregister_overwrites() {
        let mut registry = HandlerRegistry::new();
        registry.register(&["echo"], || Box::new(EchoHandler));
        registry.register(&["echo"], || Box::new(OtherHandler));

        // Last registration wins; still exactly one entry
        assert_eq!(registry.node_types(), vec!["echo"]);
        assert!(registry.get_handler("echo").is_some());
    }

    #[test]
    fn test_node_types_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register(&["zeta"], || Box::new(EchoHandler));
        registry.register(&["alpha"], || Box::new(EchoHandler));
        registry.register(&["mid"], || Box::new(EchoHandler));

        assert_eq!(registry.node_types(), vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_fresh_instance_executes() {
        let mut registry = HandlerRegistry::new();
        registry.register(&["echo"], || Box::new(EchoHandler));

        let handler = registry.get_handler("echo").unwrap();
        let node = GraphNode::new("n1", "echo").with_data(serde_json::json!({"k": "v"}));
        let mut ctx = ExecutionContext::new("exec", "wf", serde_json::Value::Null);

        let result = handler.execute(&node, &mut ctx).await.unwrap();
        assert_eq!(result.output, Some(serde_json::json!({"k": "v"})));
    }
}
