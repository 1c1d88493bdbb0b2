use crate::weather::DEFAULT_TIMEOUT;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use trailcore::{
    Coordinates, Environment, Lookup, LookupError, Node, NodeContext, NodeError, NodeOutput, Value,
};
use trailruntime::{NodeDescriptor, NodeFactory};

/// Fetches a temperature reading for the `city` variable.
///
/// The city is resolved to coordinates through the node's `options`
/// metadata, a list of `{city, lat, lon}` records, and the reading is
/// written back as `temperature`.
pub struct IntegrationNode {
    lookup: Arc<dyn Lookup>,
    timeout: Duration,
}

impl IntegrationNode {
    pub fn new(lookup: Arc<dyn Lookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    async fn fetch(&self, ctx: &NodeContext, coordinates: Coordinates) -> Result<f64, LookupError> {
        tokio::select! {
            biased;
            _ = ctx.cancellation.cancelled() => Err(LookupError::Cancelled),
            result = tokio::time::timeout(
                self.timeout,
                self.lookup.lookup(coordinates, &ctx.cancellation),
            ) => match result {
                Ok(reading) => reading,
                Err(_) => Err(LookupError::Timeout {
                    seconds: self.timeout.as_secs(),
                }),
            },
        }
    }
}

#[async_trait]
impl Node for IntegrationNode {
    fn node_type(&self) -> &str {
        "integration"
    }

    async fn execute(&self, ctx: &NodeContext, env: &mut Environment) -> Result<NodeOutput, NodeError> {
        let city = env.require_str("city")?.to_string();

        let coordinates = resolve_coordinates(&ctx.metadata, &city)
            .ok_or_else(|| NodeError::CoordinatesNotFound(city.clone()))?;

        ctx.reporter.info(format!(
            "Fetching temperature for {} ({:.4}, {:.4})",
            city, coordinates.lat, coordinates.lon
        ));

        let temperature = self.fetch(ctx, coordinates).await?;
        env.insert("temperature", temperature);

        Ok(NodeOutput::new()
            .with_output("temperature", temperature)
            .with_output("location", city))
    }
}

/// Look up `city` in the `options` metadata list by exact, case-sensitive
/// name. Entries without numeric `lat`/`lon` are skipped.
pub fn resolve_coordinates(metadata: &HashMap<String, Value>, city: &str) -> Option<Coordinates> {
    metadata
        .get("options")?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .filter(|option| option.get("city").and_then(Value::as_str) == Some(city))
        .find_map(|option| {
            Some(Coordinates {
                lat: option.get("lat")?.as_f64()?,
                lon: option.get("lon")?.as_f64()?,
            })
        })
}

pub struct IntegrationNodeFactory {
    lookup: Arc<dyn Lookup>,
    timeout: Duration,
}

impl IntegrationNodeFactory {
    pub fn new(lookup: Arc<dyn Lookup>) -> Self {
        Self {
            lookup,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl NodeFactory for IntegrationNodeFactory {
    fn create(&self, _metadata: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(IntegrationNode::new(self.lookup.clone(), self.timeout)))
    }

    fn node_type(&self) -> &str {
        "integration"
    }

    fn descriptor(&self) -> NodeDescriptor {
        NodeDescriptor {
            description: "Fetch the current temperature for a city".to_string(),
            category: "integration".to_string(),
            reads: vec!["city".to_string()],
            writes: vec!["temperature".to_string()],
        }
    }
}
