//! Per-run execution state and template resolution
//!
//! The [`ExecutionContext`] is the single source of truth for one run's data:
//! the trigger input, named variables written by handlers, and the outputs of
//! completed nodes. It also resolves `{{ ... }}` placeholders against that
//! state so node configuration can reference upstream data.
//!
//! # Placeholder forms
//!
//! - `{{name}}` — value of variable `name`
//! - `{{$trigger.path.to.field}}` — dotted-path lookup into the trigger data
//! - `{{$node.<id>.path.to.field}}` — dotted-path lookup into node `<id>`'s
//!   stored output
//!
//! Resolution never fails: an unresolvable placeholder is left verbatim in
//! the output so an author's typo surfaces visibly instead of aborting the
//! run. Substituted values are not re-scanned, so a value containing `{{`
//! cannot trigger recursive expansion.

use std::collections::HashMap;

use serde_json::Value;

/// Maximum nesting depth for sub-workflow runs.
pub const MAX_DEPTH: u32 = 10;

/// Mutable, per-run state owned exclusively by one workflow executor.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Identifier correlating this run to external records
    execution_id: String,
    /// Identifier of the workflow definition being run
    workflow_id: String,
    /// Sub-workflow nesting depth; 0 at the top level
    depth: u32,
    /// Read-only input captured at run start
    trigger_data: Value,
    /// Named variables written by handlers
    variables: HashMap<String, Value>,
    /// Outputs of completed nodes, keyed by node id
    node_outputs: HashMap<String, Value>,
}

impl ExecutionContext {
    /// Create a top-level context for one run.
    pub fn new(
        execution_id: impl Into<String>,
        workflow_id: impl Into<String>,
        trigger_data: Value,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            workflow_id: workflow_id.into(),
            depth: 0,
            trigger_data,
            variables: HashMap::new(),
            node_outputs: HashMap::new(),
        }
    }

    /// Create a top-level context with a freshly generated execution id.
    pub fn for_workflow(workflow_id: impl Into<String>, trigger_data: Value) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), workflow_id, trigger_data)
    }

    /// Create a child context for a nested sub-workflow run.
    ///
    /// The child starts with fresh variables and outputs and a depth one
    /// greater than its parent. Executors refuse to run past [`MAX_DEPTH`],
    /// so threading contexts through `child` makes the recursion guard
    /// automatic.
    pub fn child(
        &self,
        execution_id: impl Into<String>,
        workflow_id: impl Into<String>,
        trigger_data: Value,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            workflow_id: workflow_id.into(),
            depth: self.depth + 1,
            trigger_data,
            variables: HashMap::new(),
            node_outputs: HashMap::new(),
        }
    }

    /// The execution identifier for this run.
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// The workflow identifier for this run.
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Sub-workflow nesting depth (0 at the top level).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The trigger input captured at run start.
    pub fn trigger_data(&self) -> &Value {
        &self.trigger_data
    }

    /// Set a named variable, silently overwriting any previous value.
    pub fn set_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Get a named variable.
    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Store the output of a completed node.
    pub fn store_node_output(&mut self, node_id: impl Into<String>, output: Value) {
        self.node_outputs.insert(node_id.into(), output);
    }

    /// Get the stored output of a node, if it has produced one.
    pub fn node_output(&self, node_id: &str) -> Option<&Value> {
        self.node_outputs.get(node_id)
    }

    /// Resolve all `{{ ... }}` placeholders in `text`.
    ///
    /// Placeholders are non-nesting and resolved in a single left-to-right
    /// pass; anything that cannot be resolved is left in place verbatim.
    pub fn resolve_template(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];

            match after_open.find("}}") {
                Some(close) => {
                    let raw = &after_open[..close];
                    match self.lookup_placeholder(raw.trim()) {
                        Some(value) => out.push_str(&render_value(value)),
                        None => {
                            // Leave the placeholder intact, braces included
                            out.push_str(&rest[open..open + 2 + close + 2]);
                        }
                    }
                    rest = &after_open[close + 2..];
                }
                None => {
                    // Unterminated placeholder; emit the remainder as-is
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    /// Resolve placeholders recursively through a JSON value.
    ///
    /// String leaves go through [`resolve_template`](Self::resolve_template);
    /// objects and arrays are walked; other leaves pass through unchanged.
    pub fn resolve_value(&self, data: &Value) -> Value {
        match data {
            Value::String(s) => Value::String(self.resolve_template(s)),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.resolve_value(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.resolve_value(v)).collect())
            }
            other => other.clone(),
        }
    }

    /// Look up the value behind one placeholder expression.
    fn lookup_placeholder(&self, expr: &str) -> Option<&Value> {
        if let Some(path) = expr.strip_prefix("$trigger") {
            return lookup_path(&self.trigger_data, path.strip_prefix('.').unwrap_or(path));
        }
        if let Some(rest) = expr.strip_prefix("$node.") {
            let (node_id, path) = match rest.find('.') {
                Some(dot) => (&rest[..dot], &rest[dot + 1..]),
                None => (rest, ""),
            };
            return lookup_path(self.node_outputs.get(node_id)?, path);
        }
        self.variables.get(expr)
    }
}

/// Follow a dotted path into a JSON value.
///
/// Each segment is an object key or, for arrays, a numeric index
/// (e.g. `items.0.name`). Returns `None` if any segment is missing.
fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a JSON value for substitution into a template string.
///
/// Strings are inserted raw (no surrounding quotes); everything else uses
/// its compact JSON rendering.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
