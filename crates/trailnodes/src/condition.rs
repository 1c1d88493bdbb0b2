use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use trailcore::{Environment, Node, NodeContext, NodeError, NodeOutput, Value};
use trailruntime::{NodeDescriptor, NodeFactory, CONDITION_VARIABLE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    #[default]
    GreaterThan,
    LessThan,
    Equals,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "greater_than" => Some(Self::GreaterThan),
            "less_than" => Some(Self::LessThan),
            "equals" => Some(Self::Equals),
            "greater_than_or_equal" => Some(Self::GreaterThanOrEqual),
            "less_than_or_equal" => Some(Self::LessThanOrEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Equals => "equals",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThanOrEqual => "less_than_or_equal",
        }
    }

    pub fn apply(&self, actual: f64, threshold: f64) -> bool {
        match self {
            Self::GreaterThan => actual > threshold,
            Self::LessThan => actual < threshold,
            Self::Equals => actual == threshold,
            Self::GreaterThanOrEqual => actual >= threshold,
            Self::LessThanOrEqual => actual <= threshold,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares `temperature` against `threshold` and stores the result as
/// `conditionMet`
pub struct ConditionNode;

#[async_trait]
impl Node for ConditionNode {
    fn node_type(&self) -> &str {
        "condition"
    }

    async fn execute(&self, ctx: &NodeContext, env: &mut Environment) -> Result<NodeOutput, NodeError> {
        let temperature = env.require_f64("temperature")?;
        let threshold = env.require_f64("threshold")?;

        // an unrecognised name compares as greater_than but is reported as given
        let (operator, operator_name) = match env.get("operator").and_then(Value::as_str) {
            Some(raw) => match ComparisonOperator::parse(raw) {
                Some(operator) => (operator, raw.to_string()),
                None => {
                    ctx.reporter
                        .warn(format!("Unknown operator '{}', comparing as greater_than", raw));
                    (ComparisonOperator::default(), raw.to_string())
                }
            },
            None => {
                let operator = ComparisonOperator::default();
                (operator, operator.as_str().to_string())
            }
        };

        let condition_met = operator.apply(temperature, threshold);
        env.insert(CONDITION_VARIABLE, condition_met);

        let message = format!(
            "Temperature {:.1}°C {} {:.1}°C - condition {}",
            temperature,
            operator_name,
            threshold,
            if condition_met { "met" } else { "not met" }
        );
        ctx.reporter.info(message.clone());

        Ok(NodeOutput::new()
            .with_output(CONDITION_VARIABLE, condition_met)
            .with_output("threshold", threshold)
            .with_output("operator", operator_name)
            .with_output("actualValue", temperature)
            .with_output("message", message))
    }
}

pub struct ConditionNodeFactory;

impl NodeFactory for ConditionNodeFactory {
    fn create(&self, _metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(ConditionNode))
    }

    fn node_type(&self) -> &str {
        "condition"
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            description: "Compare temperature against a threshold".to_string(),
            category: "logic".to_string(),
            reads: vec![
                "temperature".to_string(),
                "threshold".to_string(),
                "operator".to_string(),
            ],
            writes: vec![CONDITION_VARIABLE.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators() {
        assert!(ComparisonOperator::GreaterThan.apply(30.0, 25.0));
        assert!(ComparisonOperator::LessThan.apply(20.0, 25.0));
        assert!(ComparisonOperator::Equals.apply(25.0, 25.0));
        assert!(ComparisonOperator::GreaterThanOrEqual.apply(25.0, 25.0));
        assert!(!ComparisonOperator::LessThanOrEqual.apply(25.5, 25.0));
    }

    #[test]
    fn parse_matches_wire_names() {
        for op in [
            ComparisonOperator::GreaterThan,
            ComparisonOperator::LessThan,
            ComparisonOperator::Equals,
            ComparisonOperator::GreaterThanOrEqual,
            ComparisonOperator::LessThanOrEqual,
        ] {
            assert_eq!(ComparisonOperator::parse(op.as_str()), Some(op));
            assert_eq!(serde_json::to_value(op).unwrap(), op.as_str());
        }
        assert_eq!(ComparisonOperator::parse("between"), None);
    }
}
