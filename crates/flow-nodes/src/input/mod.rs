//! Input nodes
//!
//! Nodes that bring external data into a workflow run.

pub mod trigger;

pub use trigger::TriggerHandler;
