mod config;
mod inputs;
mod routes;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::ServerConfig;
use routes::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trailcore::{FlowError, WorkflowError};
use trailnodes::sample::{weather_alert_workflow, WEATHER_ALERT_ID};
use trailruntime::{FileStore, FlowRuntime, MemoryStore, NodeRegistry, RuntimeConfig, WorkflowStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting trail server");

    let config = ServerConfig::from_env()?;

    let mut registry = NodeRegistry::new();
    trailnodes::register_open_meteo(&mut registry, config.lookup.clone())?;

    let store: Arc<dyn WorkflowStore> = match &config.data_dir {
        Some(dir) => Arc::new(FileStore::open(dir).await?),
        None => {
            info!("TRAIL_DATA_DIR not set, keeping workflows in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let runtime = FlowRuntime::with_registry(Arc::new(registry), RuntimeConfig::default())
        .with_store(store);

    info!(
        "Runtime initialized with node types: {}",
        runtime.registry().list_node_types().join(", ")
    );

    if config.seed_sample {
        seed_sample(&runtime).await?;
    }

    let app_state = web::Data::new(AppState {
        runtime: Arc::new(runtime),
    });

    info!("Server starting on http://{}", config.bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}

/// Store the weather alert sample unless a workflow already uses its id
async fn seed_sample(runtime: &FlowRuntime) -> anyhow::Result<()> {
    match runtime.get_workflow(WEATHER_ALERT_ID).await {
        Ok(_) => {
            info!("Sample workflow {} already present", WEATHER_ALERT_ID);
            Ok(())
        }
        Err(FlowError::Workflow(WorkflowError::NotFound(_))) => {
            runtime.register_workflow(weather_alert_workflow()).await?;
            info!("Seeded sample workflow {}", WEATHER_ALERT_ID);
            Ok(())
        }
        Err(e) => {
            warn!("Could not check for sample workflow: {}", e);
            Err(e.into())
        }
    }
}
