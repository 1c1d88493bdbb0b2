use crate::{registry::NodeRegistry, validate_graph, MemoryStore, WorkflowExecutor, WorkflowStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trailcore::{EventBus, ExecutionResponse, FlowError, Value, Workflow, WorkflowGraph};

/// Main runtime for executing workflows
pub struct FlowRuntime {
    registry: Arc<NodeRegistry>,
    executor: Arc<WorkflowExecutor>,
    event_bus: Arc<EventBus>,
    store: Arc<dyn WorkflowStore>,
}

impl FlowRuntime {
    /// Create a new runtime with default settings
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a new runtime with custom configuration
    pub fn with_config(config: RuntimeConfig) -> Self {
        let registry = Arc::new(NodeRegistry::new());
        Self::with_registry(registry, config)
    }

    /// Create a new runtime with a pre-configured registry and an
    /// in-memory store
    pub fn with_registry(registry: Arc<NodeRegistry>, config: RuntimeConfig) -> Self {
        let executor = Arc::new(WorkflowExecutor::new());
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));

        Self {
            registry,
            executor,
            event_bus,
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Replace the workflow store
    pub fn with_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.store = store;
        self
    }

    /// Get access to the node registry
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    /// Validate and persist a workflow
    pub async fn register_workflow(&self, workflow: Workflow) -> Result<(), FlowError> {
        validate_graph(&workflow.definition)?;
        self.store.save(&workflow).await?;
        tracing::info!("Registered workflow: {} ({})", workflow.name, workflow.id);
        Ok(())
    }

    pub async fn get_workflow(&self, id: &str) -> Result<Workflow, FlowError> {
        self.store.get(id).await
    }

    pub async fn list_workflows(&self) -> Result<Vec<Workflow>, FlowError> {
        self.store.list().await
    }

    /// Execute a stored workflow by ID.
    ///
    /// When `definition` is given it replaces the stored graph for this run
    /// and is persisted; a failure to persist is logged and does not stop
    /// the execution.
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        inputs: HashMap<String, Value>,
        definition: Option<WorkflowGraph>,
        cancellation: CancellationToken,
    ) -> Result<ExecutionResponse, FlowError> {
        let mut workflow = self.store.get(workflow_id).await?;

        match definition {
            Some(graph) => {
                tracing::debug!("Using provided workflow definition for {}", workflow_id);
                validate_graph(&graph)?;
                workflow.definition = graph;

                if let Err(e) = self.store.save(&workflow).await {
                    tracing::error!("Failed to save workflow definition {}: {}", workflow_id, e);
                }
            }
            None => {
                tracing::debug!("Using stored workflow definition for {}", workflow_id);
                validate_graph(&workflow.definition)?;
            }
        }

        Ok(self
            .executor
            .execute(
                &workflow.definition,
                &self.registry,
                &self.event_bus,
                &inputs,
                cancellation,
            )
            .await)
    }

    /// Execute a graph directly (without registration or validation)
    pub async fn execute(
        &self,
        graph: &WorkflowGraph,
        inputs: HashMap<String, Value>,
    ) -> ExecutionResponse {
        self.executor
            .execute(
                graph,
                &self.registry,
                &self.event_bus,
                &inputs,
                CancellationToken::new(),
            )
            .await
    }

    /// Subscribe to execution events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<trailcore::ExecutionEvent> {
        self.event_bus.subscribe()
    }

    /// Get the event bus for direct access
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Default for FlowRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
        }
    }
}
