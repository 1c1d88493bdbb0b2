use crate::inputs::ExecutionRequest;
use actix_web::{get, post, web, HttpResponse, Responder, Result as ActixResult};
use actix_ws::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use trailcore::{FlowError, Workflow, WorkflowError, WorkflowGraph};
use trailruntime::FlowRuntime;
use uuid::Uuid;

/// Application state shared across handlers
pub struct AppState {
    pub runtime: Arc<FlowRuntime>,
}

/// Request body for workflow creation
#[derive(Debug, Deserialize)]
struct CreateWorkflowRequest {
    #[serde(default)]
    id: Option<String>,
    name: String,
    definition: WorkflowGraph,
}

/// Response for workflow creation
#[derive(Debug, Serialize)]
struct WorkflowResponse {
    id: String,
    message: String,
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: &FlowError) -> HttpResponse {
    let mut builder = match e {
        FlowError::Workflow(WorkflowError::NotFound(_)) => HttpResponse::NotFound(),
        FlowError::Workflow(_) => HttpResponse::BadRequest(),
        _ => HttpResponse::InternalServerError(),
    };
    builder.json(ErrorResponse {
        error: e.to_string(),
    })
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "trail"
    }))
}

/// List all workflows
#[get("/api/workflows")]
async fn list_workflows(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let workflows = match data.runtime.list_workflows().await {
        Ok(workflows) => workflows,
        Err(e) => {
            error!("Failed to list workflows: {}", e);
            return Ok(error_response(&e));
        }
    };

    let workflow_list: Vec<_> = workflows
        .iter()
        .map(|w| {
            serde_json::json!({
                "id": w.id,
                "name": w.name,
                "nodes": w.definition.nodes.len(),
                "edges": w.definition.edges.len(),
                "updatedAt": w.updated_at,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(workflow_list))
}

/// Create or replace a workflow
#[post("/api/workflows")]
async fn create_workflow(
    data: web::Data<AppState>,
    req: web::Json<CreateWorkflowRequest>,
) -> ActixResult<impl Responder> {
    let req = req.into_inner();
    let workflow_id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut definition = req.definition;
    if definition.id.is_empty() {
        definition.id = workflow_id.clone();
    }

    info!("Creating workflow: {} ({})", req.name, workflow_id);

    match data
        .runtime
        .register_workflow(Workflow::new(workflow_id.clone(), req.name, definition))
        .await
    {
        Ok(()) => Ok(HttpResponse::Created().json(WorkflowResponse {
            id: workflow_id,
            message: "Workflow created successfully".to_string(),
        })),
        Err(e) => {
            warn!("Rejected workflow {}: {}", workflow_id, e);
            Ok(error_response(&e))
        }
    }
}

/// Get a workflow definition
#[get("/api/workflows/{id}")]
async fn get_workflow(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> ActixResult<impl Responder> {
    let workflow_id = path.into_inner();
    tracing::debug!("Returning workflow definition for {}", workflow_id);

    match data.runtime.get_workflow(&workflow_id).await {
        Ok(workflow) => {
            let graph = workflow.definition;
            let id = if graph.id.is_empty() {
                workflow.id
            } else {
                graph.id
            };
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "id": id,
                "nodes": graph.nodes,
                "edges": graph.edges,
            })))
        }
        Err(e) => {
            error!("Failed to get workflow {}: {}", workflow_id, e);
            Ok(error_response(&e))
        }
    }
}

/// Execute a workflow
#[post("/api/workflows/{id}/execute")]
async fn execute_workflow(
    data: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ExecutionRequest>,
) -> ActixResult<impl Responder> {
    let workflow_id = path.into_inner();
    let req = req.into_inner();

    let inputs = match req.build_inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("Invalid execution request for {}: {}", workflow_id, e);
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            }));
        }
    };

    info!("Executing workflow: {}", workflow_id);

    match data
        .runtime
        .execute_workflow(
            &workflow_id,
            inputs,
            req.workflow_definition,
            CancellationToken::new(),
        )
        .await
    {
        Ok(result) => {
            info!(
                "Workflow {} finished: {:?} after {} steps",
                workflow_id,
                result.status,
                result.steps.len()
            );
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            error!("Workflow {} could not be executed: {}", workflow_id, e);
            Ok(error_response(&e))
        }
    }
}

/// WebSocket endpoint for real-time events
#[get("/api/events")]
async fn websocket_events(
    req: actix_web::HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let (res, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    info!("WebSocket client connected");

    let mut events = data.runtime.subscribe_events();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if let Ok(json) = serde_json::to_string(&event) {
                                if session.text(json).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("WebSocket client lagging, skipped {} events", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    }
                }

                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }

                else => break,
            }
        }

        info!("WebSocket client disconnected");
        let _ = session.close(None).await;
    });

    Ok(res)
}

/// List available node types
#[get("/api/nodes")]
async fn list_node_types(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let registry = data.runtime.registry();

    let nodes: Vec<_> = registry
        .list_node_types()
        .iter()
        .map(|node_type| {
            let descriptor = registry.get_descriptor(node_type).unwrap_or_default();
            serde_json::json!({
                "type": node_type,
                "description": descriptor.description,
                "category": descriptor.category,
                "reads": descriptor.reads,
                "writes": descriptor.writes,
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(nodes))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(list_workflows)
        .service(create_workflow)
        .service(get_workflow)
        .service(execute_workflow)
        .service(websocket_events)
        .service(list_node_types);
}
