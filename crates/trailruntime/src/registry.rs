use std::collections::HashMap;
use std::sync::Arc;
use trailcore::{Node, NodeError, NodeKind, Value};

/// Factory trait for creating node instances
pub trait NodeFactory: Send + Sync {
    /// Create a new instance of the node for the given metadata bag
    fn create(&self, metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError>;

    /// Get node type identifier
    fn node_type(&self) -> &str;

    /// Optional: describe the node type for catalogues
    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor::default()
    }
}

/// Description of a node type and the environment variables it touches
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    pub description: String,
    pub category: String,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
}

impl Default for NodeDescriptor {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }
}

/// Registry of available node types; the dispatcher from node type to
/// behaviour.
pub struct NodeRegistry {
    factories: HashMap<String, Arc<dyn NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a node factory
    pub fn register(&mut self, factory: Arc<dyn NodeFactory>) {
        let node_type = factory.node_type().to_string();
        tracing::info!("Registering node type: {}", node_type);
        self.factories.insert(node_type, factory);
    }

    /// Create the behaviour for a node type, failing for unknown types
    pub fn create_node(
        &self,
        kind: &NodeKind,
        metadata: &HashMap<String, Value>,
    ) -> Result<Box<dyn Node>, NodeError> {
        let factory = self
            .factories
            .get(kind.as_str())
            .ok_or_else(|| NodeError::UnknownNodeType(kind.to_string()))?;

        factory.create(metadata)
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }

    /// Get all registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Get the descriptor for a node type
    pub fn get_descriptor(&self, node_type: &str) -> Option<NodeDescriptor> {
        self.factories.get(node_type).map(|f| f.descriptor())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
