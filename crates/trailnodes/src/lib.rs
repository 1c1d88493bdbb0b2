//! Standard node library
//!
//! Behaviours for the built-in node types plus the Open-Meteo lookup used by
//! `integration` nodes.

mod condition;
mod control;
mod email;
mod form;
mod integration;
pub mod sample;
mod weather;

pub use condition::{ComparisonOperator, ConditionNode};
pub use control::{EndNode, StartNode};
pub use email::{EmailNode, EMAIL_SENDER, EMAIL_SUBJECT};
pub use form::FormNode;
pub use integration::{resolve_coordinates, IntegrationNode, IntegrationNodeFactory};
pub use weather::{LookupConfig, OpenMeteoLookup, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;
use trailcore::{Lookup, LookupError};
use trailruntime::NodeRegistry;

/// Register all standard nodes with a registry; `integration` nodes query
/// `lookup` and give up after `timeout`
pub fn register_all(registry: &mut NodeRegistry, lookup: Arc<dyn Lookup>, timeout: Duration) {
    registry.register(Arc::new(control::StartNodeFactory));
    registry.register(Arc::new(control::EndNodeFactory));
    registry.register(Arc::new(form::FormNodeFactory));
    registry.register(Arc::new(
        IntegrationNodeFactory::new(lookup).with_timeout(timeout),
    ));
    registry.register(Arc::new(condition::ConditionNodeFactory));
    registry.register(Arc::new(email::EmailNodeFactory));
}

/// Register all standard nodes, backing `integration` nodes with an
/// Open-Meteo client built from `config`
pub fn register_open_meteo(
    registry: &mut NodeRegistry,
    config: LookupConfig,
) -> Result<(), LookupError> {
    let timeout = config.effective_timeout();
    let lookup = OpenMeteoLookup::new(config)?;
    register_all(registry, Arc::new(lookup), timeout);
    Ok(())
}
