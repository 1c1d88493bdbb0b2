use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use trailcore::{Environment, Node, NodeContext, NodeError, NodeOutput, Value};
use trailruntime::{NodeDescriptor, NodeFactory, CONDITION_VARIABLE};
use uuid::Uuid;

pub const EMAIL_SENDER: &str = "weather-alerts@example.com";
pub const EMAIL_SUBJECT: &str = "Weather Alert";

/// Drafts a weather alert when the preceding condition was met.
///
/// Nothing is transmitted; the draft is recorded in the step output as if
/// it had been sent.
pub struct EmailNode;

#[async_trait]
impl Node for EmailNode {
    fn node_type(&self) -> &str {
        "email"
    }

    async fn execute(&self, ctx: &NodeContext, env: &mut Environment) -> Result<NodeOutput, NodeError> {
        if env.get_bool(CONDITION_VARIABLE) != Some(true) {
            return Ok(NodeOutput::new()
                .with_output("emailSent", false)
                .with_output("message", "Condition not met, no email sent"));
        }

        let city = env.require_str("city")?;
        let temperature = env.require_f64("temperature")?;
        let recipient = env.require_str("email")?;

        let mut draft = HashMap::new();
        draft.insert("to".to_string(), Value::from(recipient));
        draft.insert("from".to_string(), Value::from(EMAIL_SENDER));
        draft.insert("subject".to_string(), Value::from(EMAIL_SUBJECT));
        draft.insert(
            "body".to_string(),
            Value::from(format!(
                "Weather alert for {}! Temperature is {:.1}°C!",
                city, temperature
            )),
        );
        draft.insert("timestamp".to_string(), Value::from(Utc::now().to_rfc3339()));

        let message_id = format!("msg_{}", Uuid::new_v4().simple());
        ctx.reporter
            .info(format!("Drafted alert {} for {}", message_id, recipient));

        Ok(NodeOutput::new()
            .with_output("emailDraft", draft)
            .with_output("deliveryStatus", "sent")
            .with_output("messageId", message_id)
            .with_output("emailSent", true))
    }
}

pub struct EmailNodeFactory;

impl NodeFactory for EmailNodeFactory {
    fn create(&self, _metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(EmailNode))
    }

    fn node_type(&self) -> &str {
        "email"
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            description: "Draft a weather alert email".to_string(),
            category: "notification".to_string(),
            reads: vec![
                CONDITION_VARIABLE.to_string(),
                "city".to_string(),
                "temperature".to_string(),
                "email".to_string(),
            ],
            writes: Vec::new(),
        }
    }
}
