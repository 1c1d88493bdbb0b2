use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single node behaviour. The message of each variant is what
/// ends up in the `error` field of the failed execution step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("{0} not found in variables")]
    MissingVariable(String),

    #[error("missing required input field: {0}")]
    MissingInputField(String),

    #[error("Invalid value for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("invalid {0} in {1} node metadata")]
    InvalidMetadata(String, String),

    #[error("coordinates not found for city: {0}")]
    CoordinatesNotFound(String),

    #[error("failed to fetch data: {0}")]
    Lookup(#[from] LookupError),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Node {0} was already visited; cycles are not supported")]
    Revisited(String),
}

/// Errors reported by the external lookup collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("lookup API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("Invalid workflow: {0}")]
    Validation(String),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("Cyclic dependency detected")]
    CyclicDependency,

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),
}
