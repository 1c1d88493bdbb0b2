use async_trait::async_trait;
use std::collections::HashMap;
use trailcore::{Environment, Node, NodeContext, NodeError, NodeOutput, Value};
use trailruntime::{NodeDescriptor, NodeFactory};

/// Collects the fields listed in `inputFields` from the environment
pub struct FormNode;

#[async_trait]
impl Node for FormNode {
    fn node_type(&self) -> &str {
        "form"
    }

    async fn execute(&self, ctx: &NodeContext, env: &mut Environment) -> Result<NodeOutput, NodeError> {
        let fields = ctx.require_metadata_list("inputFields")?;

        let mut output = NodeOutput::new();
        // Non-string entries in the field list are ignored.
        for name in fields.iter().filter_map(Value::as_str) {
            let value = env
                .get(name)
                .ok_or_else(|| NodeError::MissingInputField(name.to_string()))?;
            output = output.with_output(name, value.clone());
        }

        ctx.reporter.info(format!("Collected {} form fields", output.outputs.len()));
        Ok(output)
    }
}

pub struct FormNodeFactory;

impl NodeFactory for FormNodeFactory {
    fn create(&self, _metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(FormNode))
    }

    fn node_type(&self) -> &str {
        "form"
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            description: "Collect required input fields".to_string(),
            category: "input".to_string(),
            reads: vec!["<inputFields>".to_string()],
            writes: Vec::new(),
        }
    }
}
