//! Control-flow nodes
//!
//! Nodes that steer the traversal: conditional branching via source
//! handles, and nested workflow runs.

pub mod condition;
pub mod sub_workflow;

pub use condition::ConditionHandler;
pub use sub_workflow::SubWorkflowHandler;
