//! Runtime configuration loaded from the environment

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::constants::{CWA_API_BASE, CWA_DEFAULT_DATASET, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Clone)]
pub struct Config {
    /// Provider authorization token
    pub api_key: String,
    pub api_base: String,
    pub dataset: String,
    /// Location used when a request names none
    pub default_location: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key =
            non_empty("CWA_API_KEY").context("CWA_API_KEY environment variable is required")?;

        let timeout_secs = match non_empty("CWA_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("CWA_TIMEOUT_SECS must be a whole number, got {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            api_base: non_empty("CWA_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| CWA_API_BASE.to_string()),
            dataset: non_empty("CWA_DATASET").unwrap_or_else(|| CWA_DEFAULT_DATASET.to_string()),
            default_location: non_empty("CWA_DEFAULT_LOCATION"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
