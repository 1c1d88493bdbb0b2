use crate::LookupError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Geographic coordinates of a named location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// External data source consulted by `integration` nodes.
///
/// Implementations return a single numeric reading for the coordinates and
/// should stop early once `cancellation` fires.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(
        &self,
        coordinates: Coordinates,
        cancellation: &CancellationToken,
    ) -> Result<f64, LookupError>;
}
