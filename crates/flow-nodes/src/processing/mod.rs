//! Processing nodes
//!
//! Nodes that transform run state: writing variables and rendering
//! templates against the execution context.

pub mod set_variable;
pub mod template;

pub use set_variable::SetVariableHandler;
pub use template::TemplateHandler;
