//! Flow Nodes
//!
//! Built-in node handlers for the Flowline workflow engine.
//! Each handler implements one node type that can be wired into a
//! workflow graph; handlers register themselves at link time, so
//! `HandlerRegistry::with_builtins()` picks up everything in this crate.
//!
//! # Categories
//!
//! - **Input**: Nodes that bring external data into a run (triggers)
//! - **Processing**: Nodes that transform data (variables, templates)
//! - **Control**: Nodes for control flow (branching, sub-workflows)

pub mod control;
pub mod input;
pub mod processing;

// Re-export all handlers for convenience
pub use control::*;
pub use input::*;
pub use processing::*;
