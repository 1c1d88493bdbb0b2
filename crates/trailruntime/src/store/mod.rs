// crates/trailruntime/src/store/mod.rs

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use trailcore::{FlowError, Workflow};

/// Persistence collaborator for workflow definitions, keyed by workflow id
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Load a workflow, failing with `WorkflowError::NotFound` when absent
    async fn get(&self, id: &str) -> Result<Workflow, FlowError>;

    /// Insert or replace a workflow. Replacing keeps the original
    /// `created_at` and bumps `updated_at`.
    async fn save(&self, workflow: &Workflow) -> Result<(), FlowError>;

    /// All stored workflows, ordered by id
    async fn list(&self) -> Result<Vec<Workflow>, FlowError>;
}
