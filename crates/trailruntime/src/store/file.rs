use super::WorkflowStore;
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use trailcore::{FlowError, Workflow, WorkflowError};
use uuid::Uuid;

/// Workflow store keeping one JSON document per workflow in a directory
pub struct FileStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles in `save`
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, FlowError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::info!("Workflow file store at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, FlowError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(WorkflowError::Validation(format!("invalid workflow id: {:?}", id)).into());
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    async fn read(&self, path: &Path) -> Result<Workflow, FlowError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl WorkflowStore for FileStore {
    async fn get(&self, id: &str) -> Result<Workflow, FlowError> {
        let path = self.path_for(id)?;
        match self.read(&path).await {
            Err(FlowError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(WorkflowError::NotFound(id.to_string()).into())
            }
            other => other,
        }
    }

    async fn save(&self, workflow: &Workflow) -> Result<(), FlowError> {
        let path = self.path_for(&workflow.id)?;
        let _guard = self.write_lock.lock().await;

        let mut record = workflow.clone();
        if let Ok(existing) = self.read(&path).await {
            record.created_at = existing.created_at;
            record.updated_at = Utc::now();
        }

        let json = serde_json::to_vec_pretty(&record)?;
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", record.id, Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!("Saved workflow {} to {}", record.id, path.display());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Workflow>, FlowError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut all = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.read(&path).await {
                Ok(workflow) => all.push(workflow),
                Err(e) => tracing::warn!("Skipping unreadable workflow {}: {}", path.display(), e),
            }
        }

        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}
