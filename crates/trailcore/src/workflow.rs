use crate::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type WorkflowId = String;
pub type NodeId = String;

/// Editor documents send `null` for unset fields; read those as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stored workflow record: a named graph plus bookkeeping timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub definition: WorkflowGraph,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(id: impl Into<WorkflowId>, name: impl Into<String>, definition: WorkflowGraph) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            definition,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Complete graph definition
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowGraph {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<NodeSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<Edge>,
}

impl WorkflowGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: NodeSpec) -> NodeId {
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Add an unconditional edge.
    pub fn connect(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        self.edges.push(Edge::new(source, target));
    }

    /// Add an edge taken only when `conditionMet` equals `branch`.
    pub fn connect_branch(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        branch: bool,
    ) {
        self.edges.push(Edge::new(source, target).with_branch(branch));
    }

    pub fn find_node(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// First node of the given kind in declaration order.
    pub fn find_by_kind(&self, kind: &NodeKind) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| &n.kind == kind)
    }

    /// Edges leaving `source`, in declaration order.
    pub fn outgoing<'a, 'b>(&'a self, source: &'b str) -> impl Iterator<Item = &'a Edge> + 'b
    where
        'a: 'b,
    {
        self.edges.iter().filter(move |e| e.source == source)
    }
}

/// Node type. Unrecognised values are kept verbatim in [`NodeKind::Other`]
/// so they survive a document round-trip and can be reported at run time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Start,
    Form,
    Integration,
    Condition,
    Email,
    End,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Form => "form",
            NodeKind::Integration => "integration",
            NodeKind::Condition => "condition",
            NodeKind::Email => "email",
            NodeKind::End => "end",
            NodeKind::Other(other) => other,
        }
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "start" => NodeKind::Start,
            "form" => NodeKind::Form,
            "integration" => NodeKind::Integration,
            "condition" => NodeKind::Condition,
            "email" => NodeKind::Email,
            "end" => NodeKind::End,
            _ => NodeKind::Other(s),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        NodeKind::from(s.to_string())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node specification in a workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: Position,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: NodeData,
}

impl NodeSpec {
    pub fn new(id: impl Into<NodeId>, kind: impl Into<NodeKind>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            position: Position::default(),
            data: NodeData::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data.description = description.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }
}

/// Display label, description and the type-specific metadata bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: HashMap<String, Value>,
}

/// Edge between two nodes.
///
/// `source_handle` is the branch tag: empty for an unconditional edge,
/// `"true"` or `"false"` for a conditional one. The remaining fields are
/// editor presentation and are carried for round-tripping only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub source_handle: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub edge_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub animated: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub style: HashMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_style: Option<HashMap<String, Value>>,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{}-{}", source, target),
            source,
            target,
            ..Default::default()
        }
    }

    pub fn with_branch(mut self, branch: bool) -> Self {
        self.source_handle = branch.to_string();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Branch tag, `None` for an unconditional edge.
    pub fn branch(&self) -> Option<&str> {
        if self.source_handle.is_empty() {
            None
        } else {
            Some(&self.source_handle)
        }
    }
}

/// Node position in visual editor
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}
