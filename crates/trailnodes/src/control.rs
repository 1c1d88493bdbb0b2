use async_trait::async_trait;
use std::collections::HashMap;
use trailcore::{Environment, Node, NodeContext, NodeError, NodeOutput, Value};
use trailruntime::{NodeDescriptor, NodeFactory};

/// Entry point of a workflow; does nothing
pub struct StartNode;

#[async_trait]
impl Node for StartNode {
    fn node_type(&self) -> &str {
        "start"
    }

    async fn execute(&self, ctx: &NodeContext, env: &mut Environment) -> Result<NodeOutput, NodeError> {
        ctx.reporter.info(format!("Workflow started with {} variables", env.len()));
        Ok(NodeOutput::new())
    }
}

pub struct StartNodeFactory;

impl NodeFactory for StartNodeFactory {
    fn create(&self, _metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(StartNode))
    }

    fn node_type(&self) -> &str {
        "start"
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            description: "Workflow entry point".to_string(),
            category: "control".to_string(),
            ..Default::default()
        }
    }
}

/// Terminal node; does nothing
pub struct EndNode;

#[async_trait]
impl Node for EndNode {
    fn node_type(&self) -> &str {
        "end"
    }

    async fn execute(&self, _ctx: &NodeContext, _env: &mut Environment) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}

pub struct EndNodeFactory;

impl NodeFactory for EndNodeFactory {
    fn create(&self, _metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(EndNode))
    }

    fn node_type(&self) -> &str {
        "end"
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            description: "Marks the end of the workflow".to_string(),
            category: "control".to_string(),
            ..Default::default()
        }
    }
}
