use crate::registry::NodeRegistry;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use trailcore::{
    Edge, Environment, EventBus, ExecutionEvent, ExecutionId, ExecutionResponse, ExecutionStep,
    NodeContext, NodeError, NodeKind, NodeSpec, Value, WalkEnd, WorkflowGraph,
};

/// Environment variable that selects between `"true"` and `"false"` edges.
pub const CONDITION_VARIABLE: &str = "conditionMet";

/// Walks a workflow graph one node at a time, from the start node until no
/// further edge resolves or a step fails.
#[derive(Debug, Default)]
pub struct WorkflowExecutor;

impl WorkflowExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a workflow graph against a copy of `inputs`.
    ///
    /// Failures never escape as errors: they are recorded on the failing
    /// step and reflected in the response status.
    pub async fn execute(
        &self,
        graph: &WorkflowGraph,
        registry: &NodeRegistry,
        event_bus: &EventBus,
        inputs: &HashMap<String, Value>,
        cancellation: CancellationToken,
    ) -> ExecutionResponse {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();
        let start = graph.find_by_kind(&NodeKind::Start);

        event_bus.publish(ExecutionEvent::WalkStarted {
            execution_id,
            workflow_id: graph.id.clone(),
            start_node: start.map(|node| node.id.clone()),
            variables: inputs.len(),
            timestamp: Utc::now(),
        });

        tracing::info!("Starting workflow execution: {} ({})", graph.id, execution_id);

        let mut env = Environment::from_inputs(inputs);
        let (steps, end) = match start {
            Some(start) => {
                self.walk(graph, start, registry, event_bus, execution_id, &mut env, cancellation)
                    .await
            }
            None => {
                tracing::warn!("Workflow {} has no start node", graph.id);
                let step = ExecutionStep::system_error("No start node found in workflow");
                (vec![step], WalkEnd::NoStartNode)
            }
        };

        let response = ExecutionResponse::from_steps(steps);
        let duration_ms = start_time.elapsed().as_millis() as u64;

        event_bus.publish(ExecutionEvent::WalkFinished {
            execution_id,
            status: response.status,
            steps: response.steps.len(),
            end: end.clone(),
            duration_ms,
            timestamp: Utc::now(),
        });

        tracing::info!(
            "Workflow {} finished with status {:?} after {} steps in {}ms: {}",
            graph.id,
            response.status,
            response.steps.len(),
            duration_ms,
            end
        );

        response
    }

    #[allow(clippy::too_many_arguments)]
    async fn walk(
        &self,
        graph: &WorkflowGraph,
        start: &NodeSpec,
        registry: &NodeRegistry,
        event_bus: &EventBus,
        execution_id: ExecutionId,
        env: &mut Environment,
        cancellation: CancellationToken,
    ) -> (Vec<ExecutionStep>, WalkEnd) {
        let node_index: HashMap<&str, &NodeSpec> =
            graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut current = start;
        let mut steps = Vec::new();
        let mut visited = HashSet::new();

        loop {
            let step = if visited.insert(current.id.as_str()) {
                self.run_step(current, registry, event_bus, execution_id, env, &cancellation)
                    .await
            } else {
                let mut step = ExecutionStep::for_node(current);
                step.fail(NodeError::Revisited(current.id.clone()).to_string());
                event_bus.publish(ExecutionEvent::StepFinished {
                    execution_id,
                    step: step.clone(),
                    duration_ms: 0,
                    timestamp: Utc::now(),
                });
                step
            };

            let failed = step.is_failed();
            steps.push(step);
            if failed {
                return (steps, WalkEnd::StepFailed);
            }

            let Some(edge) = resolve_edge(graph, &current.id, env) else {
                let end = if graph.outgoing(&current.id).next().is_none() {
                    WalkEnd::NoOutgoingEdge
                } else {
                    WalkEnd::UnresolvedBranch
                };
                return (steps, end);
            };

            event_bus.publish(ExecutionEvent::EdgeTaken {
                execution_id,
                source: current.id.clone(),
                target: edge.target.clone(),
                branch: edge.branch().map(str::to_string),
                condition_met: edge.branch().and(env.get_bool(CONDITION_VARIABLE)),
                timestamp: Utc::now(),
            });

            match node_index.get(edge.target.as_str()) {
                Some(next) => current = *next,
                None => {
                    tracing::warn!(
                        "Edge from {} points at unknown node {}; ending workflow",
                        current.id,
                        edge.target
                    );
                    return (
                        steps,
                        WalkEnd::DanglingEdge {
                            target: edge.target.clone(),
                        },
                    );
                }
            }
        }
    }

    /// Dispatch one node to its behaviour and record the outcome.
    async fn run_step(
        &self,
        node: &NodeSpec,
        registry: &NodeRegistry,
        event_bus: &EventBus,
        execution_id: ExecutionId,
        env: &mut Environment,
        cancellation: &CancellationToken,
    ) -> ExecutionStep {
        let mut step = ExecutionStep::for_node(node);

        event_bus.publish(ExecutionEvent::StepStarted {
            execution_id,
            node_id: node.id.clone(),
            node_type: node.kind.to_string(),
            label: node.data.label.clone(),
            timestamp: Utc::now(),
        });

        let ctx = NodeContext {
            node_id: node.id.clone(),
            node_type: node.kind.clone(),
            metadata: node.data.metadata.clone(),
            reporter: event_bus.reporter(execution_id, node.id.clone()),
            cancellation: cancellation.clone(),
        };

        let start = Instant::now();
        let result = match registry.create_node(&node.kind, &node.data.metadata) {
            Ok(behaviour) => behaviour.execute(&ctx, env).await,
            Err(e) => Err(e),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                tracing::debug!("Node {} ({}) completed in {}ms", node.id, node.kind, duration_ms);
                step.output = output.into_step_output();
            }
            Err(e) => {
                tracing::error!("Node {} ({}) failed: {}", node.id, node.kind, e);
                step.fail(e.to_string());
            }
        }

        event_bus.publish(ExecutionEvent::StepFinished {
            execution_id,
            step: step.clone(),
            duration_ms,
            timestamp: Utc::now(),
        });

        step
    }
}

/// Resolve the edge followed out of `current`.
///
/// Outgoing edges are scanned in declaration order. An untagged edge always
/// matches; a `"true"`/`"false"` edge matches only when `conditionMet` is a
/// boolean with that value. The first match wins.
pub fn resolve_edge<'a>(
    graph: &'a WorkflowGraph,
    current: &str,
    env: &Environment,
) -> Option<&'a Edge> {
    let condition = env.get_bool(CONDITION_VARIABLE);

    graph.outgoing(current).find(|edge| match edge.branch() {
        None => true,
        Some("true") => condition == Some(true),
        Some("false") => condition == Some(false),
        Some(_) => false,
    })
}

/// Target of [`resolve_edge`]
pub fn resolve_next<'a>(
    graph: &'a WorkflowGraph,
    current: &str,
    env: &Environment,
) -> Option<&'a str> {
    resolve_edge(graph, current, env).map(|edge| edge.target.as_str())
}
