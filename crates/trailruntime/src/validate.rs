use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use trailcore::{NodeKind, WorkflowError, WorkflowGraph};

/// Check the structural invariants the walker relies on.
///
/// Rejects duplicate node ids, more than one start node, sources that mix
/// conditional and unconditional edges, repeated or unknown branch tags,
/// cycles, and graphs with no end node. A graph without a start node passes:
/// the walker reports that case itself as a failed execution.
pub fn validate_graph(graph: &WorkflowGraph) -> Result<(), WorkflowError> {
    let mut node_to_index = HashMap::new();
    let mut dag = DiGraph::<&str, ()>::new();

    for node in &graph.nodes {
        if node_to_index.contains_key(node.id.as_str()) {
            return Err(WorkflowError::DuplicateNode(node.id.clone()));
        }
        node_to_index.insert(node.id.as_str(), dag.add_node(node.id.as_str()));
    }

    let starts: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Start)
        .map(|n| n.id.as_str())
        .collect();
    if starts.len() > 1 {
        return Err(WorkflowError::Validation(format!(
            "multiple start nodes: {}",
            starts.join(", ")
        )));
    }

    check_branches(graph)?;

    for edge in &graph.edges {
        match (
            node_to_index.get(edge.source.as_str()),
            node_to_index.get(edge.target.as_str()),
        ) {
            (Some(from), Some(to)) => {
                dag.add_edge(*from, *to, ());
            }
            _ => tracing::warn!(
                "Edge {} -> {} references an unknown node and will end the walk",
                edge.source,
                edge.target
            ),
        }
    }

    if toposort(&dag, None).is_err() {
        return Err(WorkflowError::CyclicDependency);
    }

    if !graph.nodes.iter().any(|n| n.kind == NodeKind::End) {
        return Err(WorkflowError::Validation("no end node".to_string()));
    }

    Ok(())
}

#[derive(Default)]
struct BranchCounts {
    unconditional: usize,
    when_true: usize,
    when_false: usize,
}

fn check_branches(graph: &WorkflowGraph) -> Result<(), WorkflowError> {
    let mut per_source: HashMap<&str, BranchCounts> = HashMap::new();

    for edge in &graph.edges {
        let counts = per_source.entry(edge.source.as_str()).or_default();
        match edge.branch() {
            None => counts.unconditional += 1,
            Some("true") => counts.when_true += 1,
            Some("false") => counts.when_false += 1,
            Some(other) => {
                return Err(WorkflowError::InvalidConnection(format!(
                    "edge {} -> {} has unknown branch tag '{}'",
                    edge.source, edge.target, other
                )))
            }
        }
    }

    for (source, counts) in per_source {
        let conditional = counts.when_true + counts.when_false;
        if counts.unconditional > 0 && conditional > 0 {
            return Err(WorkflowError::InvalidConnection(format!(
                "node {} mixes conditional and unconditional edges",
                source
            )));
        }
        if counts.when_true > 1 || counts.when_false > 1 {
            return Err(WorkflowError::InvalidConnection(format!(
                "node {} has more than one edge for the same branch",
                source
            )));
        }
    }

    Ok(())
}
