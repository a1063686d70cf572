//! Configuration Module
//!
//! This module reads configuration values from environment variables, provides
//! sensible defaults, and validates the decompression limit. The HEC endpoint
//! and token are passed explicitly into the forwarder at construction time;
//! nothing here is ambient global state.

use crate::error::{RelayError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Splunk HTTP Event Collector endpoint URL.
    pub hec_url: String,
    /// Token sent as `Authorization: Splunk <token>`.
    pub hec_token: String,
    /// Outbound HTTP timeout in seconds.
    pub hec_timeout_secs: u64,
    /// Upper bound on decompressed attachment size in bytes.
    pub max_decompressed_size: usize,
}

impl Config {
    /// Creates a new configuration by reading environment variables.
    ///
    /// `HEC_URL` and `HEC_TOKEN` are required; the limits fall back to
    /// defaults when missing or unparsable.
    pub fn from_env() -> Result<Self> {
        let hec_url = env::var("HEC_URL")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RelayError::Config("HEC_URL is not set".into()))?;

        let hec_token = env::var("HEC_TOKEN")
            .map(|s| s.trim().to_string())
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RelayError::Config("HEC_TOKEN is not set".into()))?;

        let hec_timeout_secs = env::var("HEC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let max_decompressed_size = env::var("DMARC_MAX_DECOMPRESSED_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100 * 1024 * 1024);

        if max_decompressed_size > 500_000_000 {
            return Err(RelayError::Config(
                "max decompressed size too large (500MB limit)".into(),
            ));
        }

        Ok(Config {
            hec_url,
            hec_token,
            hec_timeout_secs,
            max_decompressed_size,
        })
    }
}
