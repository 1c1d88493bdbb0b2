use crate::{NodeSpec, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

/// Steps and whole executions share the same two outcomes.
pub type StepStatus = ExecutionStatus;

/// Outcome of processing one node during one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub node_id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub label: String,
    pub description: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStep {
    /// A completed step carrying the node's identity and display text.
    pub fn for_node(node: &NodeSpec) -> Self {
        Self {
            node_id: node.id.clone(),
            node_type: node.kind.to_string(),
            label: node.data.label.clone(),
            description: node.data.description.clone(),
            status: StepStatus::Completed,
            output: None,
            error: None,
        }
    }

    /// Synthetic step reported when the graph cannot be walked at all.
    pub fn system_error(message: impl Into<String>) -> Self {
        Self {
            node_id: "system".to_string(),
            node_type: "system".to_string(),
            label: "System Error".to_string(),
            description: String::new(),
            status: StepStatus::Failed,
            output: None,
            error: Some(message.into()),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.error = Some(message.into());
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

/// Result of one workflow execution: overall status plus the ordered trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    pub executed_at: DateTime<Utc>,
    pub status: ExecutionStatus,
    pub steps: Vec<ExecutionStep>,
}

impl ExecutionResponse {
    /// Status is `failed` as soon as any recorded step failed.
    pub fn from_steps(steps: Vec<ExecutionStep>) -> Self {
        let status = if steps.iter().any(ExecutionStep::is_failed) {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Completed
        };
        Self {
            executed_at: Utc::now(),
            status,
            steps,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_wire_format() {
        let response = ExecutionResponse::from_steps(vec![ExecutionStep::system_error(
            "No start node found in workflow",
        )]);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["steps"][0]["nodeId"], "system");
        assert_eq!(json["steps"][0]["type"], "system");
        assert!(json["steps"][0].get("output").is_none());
        assert!(json["executedAt"].is_string());
    }
}
