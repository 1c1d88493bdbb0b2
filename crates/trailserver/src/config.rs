use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;
use trailnodes::LookupConfig;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Server settings read from the process environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory for the file store; workflows are kept in memory when unset
    pub data_dir: Option<PathBuf>,
    pub lookup: LookupConfig,
    /// Store the weather alert sample on startup
    pub seed_sample: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut lookup = LookupConfig::default();
        if let Some(url) = var("TRAIL_LOOKUP_URL") {
            lookup = lookup.with_base_url(url);
        }
        if let Some(secs) = var("TRAIL_LOOKUP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("TRAIL_LOOKUP_TIMEOUT_SECS is not a number: {}", secs))?;
            lookup = lookup.with_timeout(Duration::from_secs(secs));
        }

        let seed_sample = match var("TRAIL_SEED_SAMPLE") {
            Some(flag) => parse_flag(&flag)
                .with_context(|| format!("TRAIL_SEED_SAMPLE is not a boolean: {}", flag))?,
            None => true,
        };

        Ok(Self {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            data_dir: var("TRAIL_DATA_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            lookup,
            seed_sample,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
