//! Core abstractions for the trail workflow engine
//!
//! This crate provides the workflow document model, the dynamic value and
//! variable environment types, and the traits that the runtime and node
//! library plug into. It has no runtime dependencies.

mod environment;
mod error;
pub mod events;
mod execution;
mod lookup;
mod node;
mod value;
mod workflow;

pub use environment::Environment;
pub use error::{FlowError, LookupError, NodeError, WorkflowError};
pub use events::*;
pub use execution::{ExecutionResponse, ExecutionStatus, ExecutionStep, StepStatus};
pub use lookup::{Coordinates, Lookup};
pub use node::{Node, NodeContext, NodeOutput};
pub use value::Value;
pub use workflow::{
    Edge, NodeData, NodeId, NodeKind, NodeSpec, Position, Workflow, WorkflowGraph, WorkflowId,
};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
