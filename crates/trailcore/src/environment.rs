use crate::{NodeError, Value};
use std::collections::HashMap;

/// Mutable variable scope threaded through one workflow execution.
///
/// Seeded from a copy of the caller's inputs; node behaviours read their
/// arguments from it and write their results back, which is how one node's
/// output becomes a later node's input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from a copy of `inputs`.
    pub fn from_inputs(inputs: &HashMap<String, Value>) -> Self {
        Self {
            vars: inputs.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Get a variable or fail with [`NodeError::MissingVariable`].
    pub fn require(&self, name: &str) -> Result<&Value, NodeError> {
        self.vars
            .get(name)
            .ok_or_else(|| NodeError::MissingVariable(name.to_string()))
    }

    pub fn require_str(&self, name: &str) -> Result<&str, NodeError> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| mismatch(name, "string", value))
    }

    /// Numeric variable; integer values are coerced to `f64`.
    pub fn require_f64(&self, name: &str) -> Result<f64, NodeError> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| mismatch(name, "number", value))
    }

    /// Boolean variable, `None` when absent or not a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.vars.get(name).and_then(Value::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.vars
    }
}

fn mismatch(field: &str, expected: &str, actual: &Value) -> NodeError {
    NodeError::InvalidInputType {
        field: field.to_string(),
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}
