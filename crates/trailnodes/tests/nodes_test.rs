// crates/trailnodes/tests/nodes_test.rs

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trailcore::{
    Coordinates, Environment, EventBus, ExecutionId, Lookup, LookupError, Node, NodeContext,
    NodeError, NodeKind, Value,
};
use trailnodes::{
    register_all, ConditionNode, EmailNode, FormNode, IntegrationNode, EMAIL_SENDER,
};
use trailruntime::NodeRegistry;

// Helper function to create a test context
fn create_test_context(kind: &str, metadata: HashMap<String, Value>) -> NodeContext {
    let event_bus = Arc::new(EventBus::new(100));
    let execution_id = ExecutionId::new_v4();

    NodeContext {
        node_id: kind.to_string(),
        node_type: NodeKind::from(kind),
        metadata,
        reporter: event_bus.reporter(execution_id, kind),
        cancellation: CancellationToken::new(),
    }
}

fn env(vars: &[(&str, Value)]) -> Environment {
    let mut env = Environment::new();
    for (name, value) in vars {
        env.insert(*name, value.clone());
    }
    env
}

/// Lookup returning a fixed reading and recording the coordinates asked for
struct FixedLookup {
    reading: Result<f64, LookupError>,
    delay: Duration,
    calls: std::sync::Mutex<Vec<Coordinates>>,
}

impl FixedLookup {
    fn new(reading: Result<f64, LookupError>) -> Self {
        Self {
            reading,
            delay: Duration::ZERO,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn slow(reading: f64, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(Ok(reading))
        }
    }
}

#[async_trait]
impl Lookup for FixedLookup {
    async fn lookup(
        &self,
        coordinates: Coordinates,
        _cancellation: &CancellationToken,
    ) -> Result<f64, LookupError> {
        self.calls.lock().unwrap().push(coordinates);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reading.clone()
    }
}

fn form_metadata(fields: Value) -> HashMap<String, Value> {
    let mut metadata = HashMap::new();
    metadata.insert("inputFields".to_string(), fields);
    metadata
}

fn city_options() -> HashMap<String, Value> {
    let mut metadata = HashMap::new();
    metadata.insert(
        "options".to_string(),
        Value::from(serde_json::json!([
            {"city": "Sydney", "lat": -33.8688, "lon": 151.2093},
            {"city": "Perth", "lat": -31.9505, "lon": 115.8605}
        ])),
    );
    metadata
}

#[tokio::test]
async fn test_form_copies_required_fields() {
    let ctx = create_test_context("form", form_metadata(Value::from(vec!["name", "email"])));
    let mut env = env(&[
        ("name", Value::from("John Doe")),
        ("email", Value::from("john@example.com")),
        ("city", Value::from("Sydney")),
    ]);

    let output = FormNode.execute(&ctx, &mut env).await.unwrap();

    let mut expected = HashMap::new();
    expected.insert("name".to_string(), Value::from("John Doe"));
    expected.insert("email".to_string(), Value::from("john@example.com"));
    assert_eq!(output.outputs, expected);
}

#[tokio::test]
async fn test_form_missing_field_fails() {
    let ctx = create_test_context("form", form_metadata(Value::from(vec!["name", "email"])));
    let mut env = env(&[("name", Value::from("John Doe"))]);

    let result = FormNode.execute(&ctx, &mut env).await;

    assert_eq!(result, Err(NodeError::MissingInputField("email".to_string())));
}

#[tokio::test]
async fn test_form_requires_field_list() {
    let mut env = Environment::new();

    let ctx = create_test_context("form", HashMap::new());
    let err = FormNode.execute(&ctx, &mut env).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid inputFields in form node metadata");

    let ctx = create_test_context("form", form_metadata(Value::from("name")));
    assert!(matches!(
        FormNode.execute(&ctx, &mut env).await,
        Err(NodeError::InvalidMetadata(..))
    ));
}

#[tokio::test]
async fn test_form_skips_non_string_entries() {
    let fields = Value::Array(vec![Value::from("name"), Value::Integer(7)]);
    let ctx = create_test_context("form", form_metadata(fields));
    let mut env = env(&[("name", Value::from("Ada"))]);

    let output = FormNode.execute(&ctx, &mut env).await.unwrap();
    assert_eq!(output.outputs.len(), 1);
}

async fn condition(vars: &[(&str, Value)]) -> (Result<trailcore::NodeOutput, NodeError>, Environment) {
    let ctx = create_test_context("condition", HashMap::new());
    let mut env = env(vars);
    let result = ConditionNode.execute(&ctx, &mut env).await;
    (result, env)
}

#[tokio::test]
async fn test_condition_greater_than() {
    let (result, env) = condition(&[
        ("temperature", Value::from(30.0)),
        ("threshold", Value::from(25.0)),
        ("operator", Value::from("greater_than")),
    ])
    .await;

    let output = result.unwrap();
    assert_eq!(env.get_bool("conditionMet"), Some(true));
    assert_eq!(output.get("conditionMet"), Some(&Value::Bool(true)));
    assert_eq!(output.get("actualValue"), Some(&Value::Number(30.0)));
    assert_eq!(output.get("operator"), Some(&Value::from("greater_than")));
    assert_eq!(
        output.get("message"),
        Some(&Value::from("Temperature 30.0°C greater_than 25.0°C - condition met"))
    );
}

#[tokio::test]
async fn test_condition_less_than() {
    let (result, env) = condition(&[
        ("temperature", Value::from(20.0)),
        ("threshold", Value::from(25.0)),
        ("operator", Value::from("less_than")),
    ])
    .await;

    assert!(result.is_ok());
    assert_eq!(env.get_bool("conditionMet"), Some(true));
}

#[tokio::test]
async fn test_condition_integer_threshold_matches_float() {
    let (int_result, _) = condition(&[
        ("temperature", Value::from(30.0)),
        ("threshold", Value::Integer(25)),
    ])
    .await;
    let (float_result, _) = condition(&[
        ("temperature", Value::from(30.0)),
        ("threshold", Value::Number(25.0)),
    ])
    .await;

    assert_eq!(int_result.unwrap(), float_result.unwrap());
}

#[tokio::test]
async fn test_condition_unknown_operator_compares_as_greater_than() {
    let (result, env) = condition(&[
        ("temperature", Value::from(20.0)),
        ("threshold", Value::from(25.0)),
        ("operator", Value::from("roughly")),
    ])
    .await;

    let output = result.unwrap();
    assert_eq!(env.get_bool("conditionMet"), Some(false));
    assert_eq!(output.get("operator"), Some(&Value::from("roughly")));
    assert_eq!(
        output.get("message"),
        Some(&Value::from("Temperature 20.0°C roughly 25.0°C - condition not met"))
    );

    let (result, env) = condition(&[
        ("temperature", Value::from(30.0)),
        ("threshold", Value::from(25.0)),
    ])
    .await;

    let output = result.unwrap();
    assert_eq!(env.get_bool("conditionMet"), Some(true));
    assert_eq!(output.get("operator"), Some(&Value::from("greater_than")));
}

#[tokio::test]
async fn test_condition_missing_inputs() {
    let (result, _) = condition(&[("threshold", Value::from(25.0))]).await;
    assert_eq!(result.unwrap_err().to_string(), "temperature not found in variables");

    let (result, _) = condition(&[("temperature", Value::from(25.0))]).await;
    assert_eq!(result.unwrap_err().to_string(), "threshold not found in variables");

    let (result, _) = condition(&[
        ("temperature", Value::from("hot")),
        ("threshold", Value::from(25.0)),
    ])
    .await;
    assert!(matches!(result, Err(NodeError::InvalidInputType { .. })));
}

async fn email(vars: &[(&str, Value)]) -> Result<trailcore::NodeOutput, NodeError> {
    let ctx = create_test_context("email", HashMap::new());
    let mut env = env(vars);
    EmailNode.execute(&ctx, &mut env).await
}

#[tokio::test]
async fn test_email_skipped_when_condition_not_met() {
    for vars in [
        vec![("conditionMet", Value::Bool(false))],
        vec![],
        vec![("conditionMet", Value::from("true"))],
    ] {
        let output = email(&vars).await.unwrap();
        assert_eq!(output.get("emailSent"), Some(&Value::Bool(false)));
        assert_eq!(
            output.get("message"),
            Some(&Value::from("Condition not met, no email sent"))
        );
    }
}

#[tokio::test]
async fn test_email_drafted_when_condition_met() {
    let output = email(&[
        ("conditionMet", Value::Bool(true)),
        ("city", Value::from("Perth")),
        ("temperature", Value::from(35.0)),
        ("email", Value::from("ops@example.com")),
    ])
    .await
    .unwrap();

    assert_eq!(output.get("emailSent"), Some(&Value::Bool(true)));
    assert_eq!(output.get("deliveryStatus"), Some(&Value::from("sent")));
    let message_id = output.get("messageId").and_then(Value::as_str).unwrap();
    assert!(message_id.starts_with("msg_") && message_id.len() > 4);

    let draft = output.get("emailDraft").and_then(Value::as_object).unwrap();
    assert_eq!(draft["to"], Value::from("ops@example.com"));
    assert_eq!(draft["from"], Value::from(EMAIL_SENDER));
    assert_eq!(draft["subject"], Value::from("Weather Alert"));
    assert_eq!(
        draft["body"],
        Value::from("Weather alert for Perth! Temperature is 35.0°C!")
    );
    assert!(draft["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_email_requires_recipient_details() {
    let full = [
        ("conditionMet", Value::Bool(true)),
        ("city", Value::from("Perth")),
        ("temperature", Value::from(35.0)),
        ("email", Value::from("ops@example.com")),
    ];

    for missing in ["city", "temperature", "email"] {
        let vars: Vec<(&str, Value)> = full
            .iter()
            .filter(|(name, _)| *name != missing)
            .cloned()
            .collect();
        let err = email(&vars).await.unwrap_err();
        assert_eq!(err, NodeError::MissingVariable(missing.to_string()));
    }
}

#[tokio::test]
async fn test_integration_writes_temperature() {
    let lookup = Arc::new(FixedLookup::new(Ok(28.5)));
    let node = IntegrationNode::new(lookup.clone(), Duration::from_secs(10));
    let ctx = create_test_context("integration", city_options());
    let mut env = env(&[("city", Value::from("Perth"))]);

    let output = node.execute(&ctx, &mut env).await.unwrap();

    assert_eq!(env.require_f64("temperature").unwrap(), 28.5);
    assert_eq!(output.get("temperature"), Some(&Value::Number(28.5)));
    assert_eq!(output.get("location"), Some(&Value::from("Perth")));
    assert_eq!(
        lookup.calls.lock().unwrap().as_slice(),
        &[Coordinates { lat: -31.9505, lon: 115.8605 }]
    );
}

#[tokio::test]
async fn test_integration_requires_known_city() {
    let lookup = Arc::new(FixedLookup::new(Ok(28.5)));
    let node = IntegrationNode::new(lookup.clone(), Duration::from_secs(10));
    let ctx = create_test_context("integration", city_options());

    let err = node.execute(&ctx, &mut Environment::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "city not found in variables");

    let mut env = env(&[("city", Value::from("Hobart"))]);
    let err = node.execute(&ctx, &mut env).await.unwrap_err();
    assert_eq!(err.to_string(), "coordinates not found for city: Hobart");
    assert!(lookup.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_integration_wraps_lookup_errors() {
    let lookup = Arc::new(FixedLookup::new(Err(LookupError::Status {
        status: 503,
        body: "unavailable".to_string(),
    })));
    let node = IntegrationNode::new(lookup, Duration::from_secs(10));
    let ctx = create_test_context("integration", city_options());
    let mut env = env(&[("city", Value::from("Sydney"))]);

    let err = node.execute(&ctx, &mut env).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to fetch data: lookup API error: 503 - unavailable"
    );
    assert!(!env.contains("temperature"));
}

#[tokio::test(start_paused = true)]
async fn test_integration_times_out() {
    let lookup = Arc::new(FixedLookup::slow(28.5, Duration::from_secs(60)));
    let node = IntegrationNode::new(lookup, Duration::from_secs(10));
    let ctx = create_test_context("integration", city_options());
    let mut env = env(&[("city", Value::from("Sydney"))]);

    let err = node.execute(&ctx, &mut env).await.unwrap_err();

    assert_eq!(err, NodeError::Lookup(LookupError::Timeout { seconds: 10 }));
}

#[tokio::test(start_paused = true)]
async fn test_registered_integration_uses_the_given_timeout() {
    let mut registry = NodeRegistry::new();
    let lookup = Arc::new(FixedLookup::slow(28.5, Duration::from_secs(60)));
    register_all(&mut registry, lookup, Duration::from_secs(3));

    let node = registry
        .create_node(&NodeKind::from("integration"), &city_options())
        .unwrap();
    let ctx = create_test_context("integration", city_options());
    let mut env = env(&[("city", Value::from("Sydney"))]);

    let err = node.execute(&ctx, &mut env).await.unwrap_err();

    assert_eq!(err, NodeError::Lookup(LookupError::Timeout { seconds: 3 }));
    assert_eq!(
        registry
            .list_node_types()
            .iter()
            .filter(|t| t.as_str() == "integration")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_integration_honours_cancellation() {
    let lookup = Arc::new(FixedLookup::new(Ok(28.5)));
    let node = IntegrationNode::new(lookup.clone(), Duration::from_secs(10));
    let ctx = create_test_context("integration", city_options());
    ctx.cancellation.cancel();
    let mut env = env(&[("city", Value::from("Sydney"))]);

    let err = node.execute(&ctx, &mut env).await.unwrap_err();

    assert_eq!(err, NodeError::Lookup(LookupError::Cancelled));
    assert_eq!(err.to_string(), "failed to fetch data: cancelled");
}
