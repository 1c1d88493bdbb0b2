use crate::{events::StepReporter, Environment, NodeError, NodeId, NodeKind, Value};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Core trait that all node behaviours implement
#[async_trait]
pub trait Node: Send + Sync {
    /// Node type this behaviour handles (e.g. "form", "condition")
    fn node_type(&self) -> &str;

    /// Execute the node against the shared variable environment.
    ///
    /// A failing behaviour may leave `env` partially updated; the walker
    /// stops at the failed step either way.
    async fn execute(&self, ctx: &NodeContext, env: &mut Environment)
        -> Result<NodeOutput, NodeError>;
}

/// Execution context passed to each node
#[derive(Clone)]
pub struct NodeContext {
    pub node_id: NodeId,

    pub node_type: NodeKind,

    /// Type-specific metadata bag from the workflow document
    pub metadata: HashMap<String, Value>,

    /// Reports progress messages for this step
    pub reporter: StepReporter,

    /// Cancellation signal supplied by the caller of the execution
    pub cancellation: tokio_util::sync::CancellationToken,
}

impl NodeContext {
    /// Get a metadata entry or fail with [`NodeError::InvalidMetadata`]
    pub fn require_metadata(&self, name: &str) -> Result<&Value, NodeError> {
        self.metadata
            .get(name)
            .ok_or_else(|| self.invalid_metadata(name))
    }

    /// Metadata entry that must be a list
    pub fn require_metadata_list(&self, name: &str) -> Result<&[Value], NodeError> {
        self.require_metadata(name)?
            .as_array()
            .ok_or_else(|| self.invalid_metadata(name))
    }

    fn invalid_metadata(&self, name: &str) -> NodeError {
        NodeError::InvalidMetadata(name.to_string(), self.node_type.to_string())
    }
}

/// Output from node execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeOutput {
    pub outputs: HashMap<String, Value>,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, port: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(port.into(), value.into());
        self
    }

    pub fn get(&self, port: &str) -> Option<&Value> {
        self.outputs.get(port)
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Payload recorded on the execution step; nothing is recorded for an
    /// empty output.
    pub fn into_step_output(self) -> Option<HashMap<String, Value>> {
        if self.outputs.is_empty() {
            None
        } else {
            Some(self.outputs)
        }
    }
}

impl From<HashMap<String, Value>> for NodeOutput {
    fn from(outputs: HashMap<String, Value>) -> Self {
        Self { outputs }
    }
}
