use super::WorkflowStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use trailcore::{FlowError, Workflow, WorkflowError, WorkflowId};

/// In-process workflow store
#[derive(Default)]
pub struct MemoryStore {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Workflow, FlowError> {
        let workflows = self.workflows.read().await;
        workflows
            .get(id)
            .cloned()
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()).into())
    }

    async fn save(&self, workflow: &Workflow) -> Result<(), FlowError> {
        let mut workflows = self.workflows.write().await;
        let mut record = workflow.clone();
        if let Some(existing) = workflows.get(&workflow.id) {
            record.created_at = existing.created_at;
            record.updated_at = Utc::now();
        }
        workflows.insert(record.id.clone(), record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Workflow>, FlowError> {
        let workflows = self.workflows.read().await;
        let mut all: Vec<Workflow> = workflows.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}
