//! The weather alert workflow shipped with the server and `trail init`.

use serde_json::json;
use trailcore::{Edge, NodeSpec, Value, Workflow, WorkflowGraph};

pub const WEATHER_ALERT_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
pub const WEATHER_ALERT_NAME: &str = "Weather Alert Workflow";

/// start → form → weather-api → condition → (true: email → end | false: end)
pub fn weather_alert_workflow() -> Workflow {
    Workflow::new(WEATHER_ALERT_ID, WEATHER_ALERT_NAME, weather_alert_graph())
}

pub fn weather_alert_graph() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new(WEATHER_ALERT_ID);

    graph.add_node(
        NodeSpec::new("start", "start")
            .with_label("Start")
            .with_description("Begin weather check workflow")
            .with_position(-160.0, 300.0)
            .with_metadata("hasHandles", json_value(json!({"source": true, "target": false}))),
    );
    graph.add_node(
        NodeSpec::new("form", "form")
            .with_label("User Input")
            .with_description("Process collected data - name, email, location")
            .with_position(152.0, 304.0)
            .with_metadata("hasHandles", json_value(json!({"source": true, "target": true})))
            .with_metadata("inputFields", vec!["name", "email", "city"])
            .with_metadata("outputVariables", vec!["name", "email", "city"]),
    );
    graph.add_node(
        NodeSpec::new("weather-api", "integration")
            .with_label("Weather API")
            .with_description("Fetch current temperature for {{city}}")
            .with_position(460.0, 304.0)
            .with_metadata("hasHandles", json_value(json!({"source": true, "target": true})))
            .with_metadata("inputVariables", vec!["city"])
            .with_metadata(
                "apiEndpoint",
                "https://api.open-meteo.com/v1/forecast?latitude={lat}&longitude={lon}&current_weather=true",
            )
            .with_metadata(
                "options",
                json_value(json!([
                    {"city": "Sydney", "lat": -33.8688, "lon": 151.2093},
                    {"city": "Melbourne", "lat": -37.8136, "lon": 144.9631},
                    {"city": "Brisbane", "lat": -27.4698, "lon": 153.0251},
                    {"city": "Perth", "lat": -31.9505, "lon": 115.8605},
                    {"city": "Adelaide", "lat": -34.9285, "lon": 138.6007}
                ])),
            )
            .with_metadata("outputVariables", vec!["temperature"]),
    );
    graph.add_node(
        NodeSpec::new("condition", "condition")
            .with_label("Check Condition")
            .with_description("Evaluate temperature threshold")
            .with_position(794.0, 304.0)
            .with_metadata(
                "hasHandles",
                json_value(json!({"source": ["true", "false"], "target": true})),
            )
            .with_metadata("conditionExpression", "temperature {{operator}} {{threshold}}")
            .with_metadata("outputVariables", vec!["conditionMet"]),
    );
    graph.add_node(
        NodeSpec::new("email", "email")
            .with_label("Send Alert")
            .with_description("Email weather alert notification")
            .with_position(1096.0, 88.0)
            .with_metadata("hasHandles", json_value(json!({"source": true, "target": true})))
            .with_metadata("inputVariables", vec!["name", "city", "temperature"])
            .with_metadata(
                "emailTemplate",
                json_value(json!({
                    "subject": "Weather Alert",
                    "body": "Weather alert for {{city}}! Temperature is {{temperature}}°C!"
                })),
            )
            .with_metadata("outputVariables", vec!["emailSent"]),
    );
    graph.add_node(
        NodeSpec::new("end", "end")
            .with_label("Complete")
            .with_description("Workflow execution finished")
            .with_position(1360.0, 302.0)
            .with_metadata("hasHandles", json_value(json!({"source": false, "target": true}))),
    );

    graph.edges = vec![
        styled(Edge::new("start", "form").with_label("Initialize"), "e1", "#10b981", 3),
        styled(Edge::new("form", "weather-api").with_label("Submit Data"), "e2", "#3b82f6", 3),
        styled(
            Edge::new("weather-api", "condition").with_label("Temperature Data"),
            "e3",
            "#f97316",
            3,
        ),
        labelled(
            styled(
                Edge::new("condition", "email")
                    .with_branch(true)
                    .with_label("✓ Condition Met"),
                "e4",
                "#10b981",
                3,
            ),
            "#10b981",
        ),
        labelled(
            styled(
                Edge::new("condition", "end")
                    .with_branch(false)
                    .with_label("✗ No Alert Needed"),
                "e5",
                "#6b7280",
                3,
            ),
            "#6b7280",
        ),
        labelled(
            styled(Edge::new("email", "end").with_label("Alert Sent"), "e6", "#ef4444", 2),
            "#ef4444",
        ),
    ];

    graph
}

fn json_value(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn styled(mut edge: Edge, id: &str, stroke: &str, width: i64) -> Edge {
    edge.id = id.to_string();
    edge.edge_type = "smoothstep".to_string();
    edge.animated = true;
    edge.style.insert("stroke".to_string(), Value::from(stroke));
    edge.style.insert("strokeWidth".to_string(), Value::from(width));
    edge
}

fn labelled(mut edge: Edge, fill: &str) -> Edge {
    let mut style = std::collections::HashMap::new();
    style.insert("fill".to_string(), Value::from(fill));
    style.insert("fontWeight".to_string(), Value::from("bold"));
    edge.label_style = Some(style);
    edge
}
