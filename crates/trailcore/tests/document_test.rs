// crates/trailcore/tests/document_test.rs

use trailcore::{Edge, NodeKind, NodeSpec, Value, Workflow, WorkflowGraph};

const DOCUMENT: &str = r##"{
  "id": "550e8400-e29b-41d4-a716-446655440000",
  "nodes": [
    {
      "id": "start",
      "type": "start",
      "position": {"x": -160, "y": 300},
      "data": {
        "label": "Start",
        "description": "Begin weather check workflow",
        "metadata": {"hasHandles": {"source": true, "target": false}}
      }
    },
    {
      "id": "weather-api",
      "type": "integration",
      "position": {"x": 460, "y": 304},
      "data": {
        "label": "Weather API",
        "description": "Fetch current temperature for {{city}}",
        "metadata": {
          "inputVariables": ["city"],
          "options": [
            {"city": "Sydney", "lat": -33.8688, "lon": 151.2093},
            {"city": "Perth", "lat": -31.9505, "lon": 115.8605}
          ]
        }
      }
    },
    {
      "id": "end",
      "type": "end",
      "position": {"x": 1360, "y": 302},
      "data": {"label": "Complete", "description": "Workflow execution finished", "metadata": {}}
    }
  ],
  "edges": [
    {
      "id": "e1", "source": "start", "target": "weather-api", "type": "smoothstep",
      "animated": true, "style": {"stroke": "#10b981", "strokeWidth": 3}, "label": "Initialize"
    },
    {
      "id": "e2", "source": "weather-api", "target": "end", "type": "smoothstep",
      "animated": true, "style": {"stroke": "#ef4444", "strokeWidth": 2}, "label": "Done",
      "labelStyle": {"fill": "#ef4444", "fontWeight": "bold"}, "sourceHandle": "true"
    }
  ]
}"##;

#[test]
fn test_document_round_trip_is_structurally_identical() {
    let graph: WorkflowGraph = serde_json::from_str(DOCUMENT).unwrap();
    let encoded = serde_json::to_string(&graph).unwrap();
    let decoded: WorkflowGraph = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, graph);
    assert_eq!(decoded.nodes.len(), 3);
    assert_eq!(decoded.edges.len(), 2);

    for (before, after) in graph.nodes.iter().zip(&decoded.nodes) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.kind, after.kind);
        assert_eq!(before.data.metadata, after.data.metadata);
    }
    assert_eq!(decoded.edges[1].branch(), Some("true"));
    assert_eq!(decoded.edges[0].branch(), None);
}

#[test]
fn test_document_field_shapes() {
    let graph: WorkflowGraph = serde_json::from_str(DOCUMENT).unwrap();
    let api = graph.find_node("weather-api").unwrap();

    assert_eq!(api.kind, NodeKind::Integration);
    let options = api.data.metadata["options"].as_array().unwrap();
    let sydney = options[0].as_object().unwrap();
    assert_eq!(sydney["city"], Value::from("Sydney"));
    assert_eq!(sydney["lat"].as_f64(), Some(-33.8688));

    let start = graph.find_node("start").unwrap();
    assert_eq!(start.position.x, -160.0);
}

#[test]
fn test_workflow_record_round_trip() {
    let mut graph = WorkflowGraph::new("wf-1");
    graph.add_node(NodeSpec::new("start", "start").with_label("Start"));
    graph.add_node(NodeSpec::new("end", NodeKind::End).with_label("Complete"));
    graph.edges.push(Edge::new("start", "end").with_label("Initialize"));

    let workflow = Workflow::new("wf-1", "Round trip", graph);
    let json = serde_json::to_string_pretty(&workflow).unwrap();
    let decoded: Workflow = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, workflow);
}

#[test]
fn test_document_accepts_null_fields() {
    let json = r#"{
      "id": null,
      "nodes": [
        {"id": "start", "type": "start", "position": null, "data": null},
        {"id": "end", "type": "end", "position": {"x": 1, "y": 2},
         "data": {"label": null, "description": null, "metadata": null}}
      ],
      "edges": [
        {"id": null, "source": "start", "target": "end", "sourceHandle": null,
         "type": null, "animated": null, "style": null, "label": null, "labelStyle": null}
      ]
    }"#;

    let graph: WorkflowGraph = serde_json::from_str(json).unwrap();

    assert_eq!(graph.id, "");
    assert_eq!(graph.nodes[0].data.label, "");
    assert_eq!(graph.nodes[0].position.x, 0.0);
    assert!(graph.nodes[1].data.metadata.is_empty());
    assert_eq!(graph.edges[0].branch(), None);
    assert!(graph.edges[0].style.is_empty());

    let encoded = serde_json::to_string(&graph).unwrap();
    let decoded: WorkflowGraph = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, graph);
}
