use crate::{ExecutionStatus, ExecutionStep, NodeId, WorkflowId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

pub type ExecutionId = Uuid;

/// Progress of one walk over a workflow graph, in the order it happens.
///
/// Every walk opens with [`ExecutionEvent::WalkStarted`] and closes with
/// [`ExecutionEvent::WalkFinished`]. In between, each visited node produces a
/// `StepStarted`/`StepFinished` pair, and each edge followed out of a
/// completed step produces an `EdgeTaken`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionEvent {
    WalkStarted {
        execution_id: ExecutionId,
        workflow_id: WorkflowId,
        /// `None` when the graph has no start node; the walk ends at once
        start_node: Option<NodeId>,
        /// Number of caller-supplied variables
        variables: usize,
        timestamp: DateTime<Utc>,
    },
    StepStarted {
        execution_id: ExecutionId,
        node_id: NodeId,
        node_type: String,
        label: String,
        timestamp: DateTime<Utc>,
    },
    /// The recorded step, exactly as it appears in the execution trace
    StepFinished {
        execution_id: ExecutionId,
        step: ExecutionStep,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    EdgeTaken {
        execution_id: ExecutionId,
        source: NodeId,
        target: NodeId,
        /// `"true"` or `"false"` for a conditional edge
        branch: Option<String>,
        /// `conditionMet` as read when a conditional edge was chosen
        condition_met: Option<bool>,
        timestamp: DateTime<Utc>,
    },
    NodeMessage {
        execution_id: ExecutionId,
        node_id: NodeId,
        level: MessageLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },
    WalkFinished {
        execution_id: ExecutionId,
        status: ExecutionStatus,
        steps: usize,
        end: WalkEnd,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl ExecutionEvent {
    pub fn execution_id(&self) -> ExecutionId {
        match self {
            Self::WalkStarted { execution_id, .. }
            | Self::StepStarted { execution_id, .. }
            | Self::StepFinished { execution_id, .. }
            | Self::EdgeTaken { execution_id, .. }
            | Self::NodeMessage { execution_id, .. }
            | Self::WalkFinished { execution_id, .. } => *execution_id,
        }
    }

    /// True for the last event of a walk
    pub fn is_final(&self) -> bool {
        matches!(self, Self::WalkFinished { .. })
    }
}

/// Why a walk stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum WalkEnd {
    NoStartNode,
    /// The last node has no outgoing edge
    NoOutgoingEdge,
    /// Outgoing edges exist but none matched `conditionMet`
    UnresolvedBranch,
    /// The matched edge names a node missing from the graph
    DanglingEdge { target: NodeId },
    /// The last recorded step failed
    StepFailed,
}

impl fmt::Display for WalkEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkEnd::NoStartNode => write!(f, "no start node"),
            WalkEnd::NoOutgoingEdge => write!(f, "no outgoing edge"),
            WalkEnd::UnresolvedBranch => write!(f, "no edge matched conditionMet"),
            WalkEnd::DanglingEdge { target } => write!(f, "edge points at unknown node {}", target),
            WalkEnd::StepFailed => write!(f, "step failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
}

/// Handed to a node behaviour so it can report on the step it is running
#[derive(Clone)]
pub struct StepReporter {
    execution_id: ExecutionId,
    node_id: NodeId,
    sender: broadcast::Sender<ExecutionEvent>,
}

impl StepReporter {
    pub fn info(&self, message: impl Into<String>) {
        self.report(MessageLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.report(MessageLevel::Warning, message.into());
    }

    fn report(&self, level: MessageLevel, message: String) {
        let _ = self.sender.send(ExecutionEvent::NodeMessage {
            execution_id: self.execution_id,
            node_id: self.node_id.clone(),
            level,
            message,
            timestamp: Utc::now(),
        });
    }
}

/// Fan-out of execution events to every subscriber.
///
/// Publishing never blocks and never fails; events are dropped when nobody
/// is subscribed, and slow subscribers see a lag error.
pub struct EventBus {
    sender: broadcast::Sender<ExecutionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn reporter(&self, execution_id: ExecutionId, node_id: impl Into<NodeId>) -> StepReporter {
        StepReporter {
            execution_id,
            node_id: node_id.into(),
            sender: self.sender.clone(),
        }
    }
}
