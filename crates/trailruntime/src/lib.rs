//! Workflow execution runtime
//!
//! This crate provides the graph walker that runs workflows, the node
//! registry that dispatches node types to behaviours, load-time graph
//! validation, and the workflow stores.

mod executor;
mod registry;
mod runtime;
mod store;
mod validate;

pub use executor::{resolve_edge, resolve_next, WorkflowExecutor, CONDITION_VARIABLE};
pub use registry::{NodeDescriptor, NodeFactory, NodeRegistry};
pub use runtime::{FlowRuntime, RuntimeConfig};
pub use store::{FileStore, MemoryStore, WorkflowStore};
pub use validate::validate_graph;
