//! Node handler contract
//!
//! A [`NodeHandler`] is the pluggable unit of work behind one node type:
//! a synchronous configuration pre-check plus an async execution step.
//! Concrete handlers live outside the engine; this module only defines the
//! contract and the link-time registration mechanism.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::result::NodeResult;
use crate::types::GraphNode;

/// The pluggable unit of work for one node type.
///
/// Handlers are stateless: the registry creates a fresh instance per
/// execution, so implementations should be cheap unit structs.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    /// Side-effect-free pre-check of the node's configuration shape.
    ///
    /// Returns a message describing the problem, or `None` if the
    /// configuration is acceptable. A non-`None` result short-circuits
    /// execution and is reported as a validation failure.
    fn validate(&self, _data: &Value) -> Option<String> {
        None
    }

    /// Execute the node against the run's context.
    ///
    /// May suspend on I/O. Must not mutate the graph; may freely read
    /// trigger data and read/write variables through the context. An `Err`
    /// is normalized by the executor into the [`NodeResult`] failure
    /// channel, so a misbehaving handler cannot abort the traversal loop.
    async fn execute(&self, node: &GraphNode, ctx: &mut ExecutionContext) -> Result<NodeResult>;
}

/// Link-time registration of a node handler.
///
/// Handler crates submit one of these per handler; the registry collects
/// them via [`HandlerRegistry::with_builtins`](crate::HandlerRegistry::with_builtins).
/// A handler may claim several type identifiers (aliases).
///
/// # Example
///
/// ```ignore
/// inventory::submit!(flow_engine::HandlerRegistration {
///     node_types: &["condition"],
///     factory: || Box::new(ConditionHandler),
/// });
/// ```
pub struct HandlerRegistration {
    /// Type identifiers this handler is registered under
    pub node_types: &'static [&'static str],
    /// Factory function creating a fresh handler instance
    pub factory: fn() -> Box<dyn NodeHandler>,
}

inventory::collect!(HandlerRegistration);
