//! Execution request body and its conversion into workflow inputs

use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use trailcore::{Value, WorkflowGraph};

/// Body of `POST /api/workflows/{id}/execute`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    #[serde(default)]
    pub form_data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub condition: Option<HashMap<String, serde_json::Value>>,
    /// Replaces the stored definition for this run and is saved over it
    #[serde(default)]
    pub workflow_definition: Option<WorkflowGraph>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Invalid threshold value: {0}")]
    ThresholdValue(String),

    #[error("Invalid threshold type: {0}")]
    ThresholdType(String),
}

impl ExecutionRequest {
    /// Flatten the request into the initial variable environment.
    ///
    /// Form entries are copied as-is. From `condition`, a string `operator`
    /// is copied and `threshold` is normalised to a float.
    pub fn build_inputs(&self) -> Result<HashMap<String, Value>, InputError> {
        let mut inputs: HashMap<String, Value> = self
            .form_data
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect();

        let Some(condition) = &self.condition else {
            return Ok(inputs);
        };

        if let Some(operator) = condition.get("operator").and_then(serde_json::Value::as_str) {
            inputs.insert("operator".to_string(), Value::from(operator));
        }

        if let Some(threshold) = condition.get("threshold") {
            inputs.insert("threshold".to_string(), Value::from(parse_threshold(threshold)?));
        }

        Ok(inputs)
    }
}

fn parse_threshold(raw: &serde_json::Value) -> Result<f64, InputError> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| InputError::ThresholdValue(n.to_string())),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| InputError::ThresholdValue(s.clone())),
        other => Err(InputError::ThresholdType(type_name(other).to_string())),
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> ExecutionRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn form_data_and_condition_are_flattened() {
        let inputs = request(json!({
            "formData": {"name": "John Doe", "email": "john@example.com", "city": "Sydney"},
            "condition": {"operator": "greater_than", "threshold": 25}
        }))
        .build_inputs()
        .unwrap();

        assert_eq!(inputs["city"], Value::from("Sydney"));
        assert_eq!(inputs["operator"], Value::from("greater_than"));
        assert_eq!(inputs["threshold"], Value::Number(25.0));
        assert_eq!(inputs.len(), 5);
    }

    #[test]
    fn threshold_accepts_numeric_strings() {
        let inputs = request(json!({"condition": {"threshold": " 18.5 "}}))
            .build_inputs()
            .unwrap();
        assert_eq!(inputs["threshold"], Value::Number(18.5));
    }

    #[test]
    fn threshold_rejects_other_values() {
        let err = request(json!({"condition": {"threshold": "warm"}}))
            .build_inputs()
            .unwrap_err();
        assert_eq!(err, InputError::ThresholdValue("warm".to_string()));

        let err = request(json!({"condition": {"threshold": [25]}}))
            .build_inputs()
            .unwrap_err();
        assert_eq!(err, InputError::ThresholdType("array".to_string()));
    }

    #[test]
    fn non_string_operator_is_ignored() {
        let inputs = request(json!({"condition": {"operator": 3}}))
            .build_inputs()
            .unwrap();
        assert!(inputs.is_empty());
    }

    #[test]
    fn definition_override_is_parsed() {
        let req = request(json!({
            "workflowDefinition": {
                "id": "wf",
                "nodes": [{"id": "start", "type": "start", "position": {"x": 0, "y": 0},
                           "data": {"label": "Start", "description": "", "metadata": {}}},
                          {"id": "end", "type": "end", "data": {"metadata": null}}],
                "edges": [{"source": "start", "target": "end", "sourceHandle": null}]
            }
        }));
        let graph = req.workflow_definition.unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges[0].branch(), None);
    }
}
