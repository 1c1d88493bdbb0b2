use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trailcore::{Coordinates, Lookup, LookupError};

/// Default timeout for lookups: 10 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

/// Configuration for the Open-Meteo HTTP client.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Scheme and host of the forecast API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Idle connections kept per host in the pool.
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            pool_max_idle_per_host: 8,
            user_agent: format!("trail/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LookupConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.timeout
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
}

/// Current temperature lookup backed by the Open-Meteo forecast API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct OpenMeteoLookup {
    client: reqwest::Client,
    config: LookupConfig,
}

impl OpenMeteoLookup {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        tracing::debug!(
            base_url = %config.base_url,
            timeout_ms = config.effective_timeout().as_millis() as u64,
            "Creating lookup client"
        );

        let client = reqwest::Client::builder()
            .timeout(config.effective_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LookupError::Transport(format!("failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    fn forecast_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}/v1/forecast?latitude={:.4}&longitude={:.4}&current_weather=true",
            self.config.base_url.trim_end_matches('/'),
            coordinates.lat,
            coordinates.lon
        )
    }

    async fn fetch(&self, url: &str) -> Result<f64, LookupError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout {
                    seconds: self.config.effective_timeout().as_secs(),
                }
            } else {
                LookupError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_forecast(&body)
    }
}

#[async_trait]
impl Lookup for OpenMeteoLookup {
    async fn lookup(
        &self,
        coordinates: Coordinates,
        cancellation: &CancellationToken,
    ) -> Result<f64, LookupError> {
        let url = self.forecast_url(coordinates);
        tracing::debug!("GET {}", url);

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(LookupError::Cancelled),
            result = self.fetch(&url) => result,
        }
    }
}

fn parse_forecast(body: &str) -> Result<f64, LookupError> {
    serde_json::from_str::<ForecastResponse>(body)
        .map(|forecast| forecast.current_weather.temperature)
        .map_err(|e| LookupError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = LookupConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.starts_with("trail/"));
    }

    #[test]
    fn test_effective_timeout_uses_default_when_zero() {
        let config = LookupConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(config.effective_timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_forecast_url() {
        let lookup =
            OpenMeteoLookup::new(LookupConfig::default().with_base_url("http://localhost:9/")).unwrap();
        let url = lookup.forecast_url(Coordinates {
            lat: -33.8688,
            lon: 151.2093,
        });
        assert_eq!(
            url,
            "http://localhost:9/v1/forecast?latitude=-33.8688&longitude=151.2093&current_weather=true"
        );
    }

    #[test]
    fn test_parse_forecast() {
        let body = r#"{"latitude": -33.875, "current_weather": {"temperature": 21.4, "windspeed": 9.7}}"#;
        assert_eq!(parse_forecast(body).unwrap(), 21.4);
        assert!(matches!(parse_forecast("{}"), Err(LookupError::Decode(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let lookup = OpenMeteoLookup::new(LookupConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = lookup
            .lookup(Coordinates { lat: 0.0, lon: 0.0 }, &token)
            .await;
        assert_eq!(result, Err(LookupError::Cancelled));
    }
}
