// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use crate::constants::insights::{DEFAULT_EXCERPT_CHARS, DEFAULT_MAX_NOTES, DEFAULT_TIMEOUT_SECONDS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Address the HTTP API binds to
    pub http_host: String,
    /// Log level
    pub log_level: String,
    /// Text-generation service used for weekly insights
    pub enrichment: EnrichmentConfig,
    /// Path to the progress rules TOML file
    pub progress_config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Endpoint of the text-generation service
    pub api_url: Option<String>,
    /// Bearer credential for the text-generation service
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Outbound request timeout in seconds
    pub timeout_seconds: u64,
    /// Characters kept from each reflection in the prompt
    pub excerpt_chars: usize,
    /// Reflections included in one prompt
    pub max_notes: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            max_notes: DEFAULT_MAX_NOTES,
        }
    }
}

impl EnrichmentConfig {
    /// Both endpoint and credential are present
    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenv::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = ServerConfig {
            http_port: env_var_or("HTTP_PORT", "8081")?
                .parse()
                .context("Invalid HTTP_PORT value")?,
            http_host: env_var_or("HTTP_HOST", "127.0.0.1")?,
            log_level: env_var_or("RUST_LOG", "info")?,

            enrichment: EnrichmentConfig {
                api_url: non_empty_var("INSIGHTS_API_URL"),
                api_key: non_empty_var("INSIGHTS_API_KEY"),
                timeout_seconds: env_var_or(
                    "INSIGHTS_TIMEOUT_SECONDS",
                    &DEFAULT_TIMEOUT_SECONDS.to_string(),
                )?
                .parse()
                .context("Invalid INSIGHTS_TIMEOUT_SECONDS value")?,
                excerpt_chars: env_var_or(
                    "INSIGHTS_EXCERPT_CHARS",
                    &DEFAULT_EXCERPT_CHARS.to_string(),
                )?
                .parse()
                .context("Invalid INSIGHTS_EXCERPT_CHARS value")?,
                max_notes: env_var_or("INSIGHTS_MAX_NOTES", &DEFAULT_MAX_NOTES.to_string())?
                    .parse()
                    .context("Invalid INSIGHTS_MAX_NOTES value")?,
            },

            progress_config_path: non_empty_var("PROGRESS_CONFIG_PATH").map(PathBuf::from),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.http_host.trim().is_empty() {
            return Err(anyhow::anyhow!("HTTP_HOST cannot be empty"));
        }

        if let Some(api_url) = &self.enrichment.api_url {
            let url = url::Url::parse(api_url)
                .with_context(|| format!("Invalid INSIGHTS_API_URL: {}", api_url))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(anyhow::anyhow!(
                    "INSIGHTS_API_URL must use http or https, got {}",
                    url.scheme()
                ));
            }

            if self.enrichment.api_key.is_none() {
                warn!("INSIGHTS_API_URL is set but INSIGHTS_API_KEY is missing; weekly insights will not be enriched");
            }
        }

        if self.enrichment.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("INSIGHTS_TIMEOUT_SECONDS must be greater than zero"));
        }

        if self.enrichment.excerpt_chars == 0 || self.enrichment.max_notes == 0 {
            return Err(anyhow::anyhow!(
                "INSIGHTS_EXCERPT_CHARS and INSIGHTS_MAX_NOTES must be greater than zero"
            ));
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    pub fn summary(&self) -> String {
        format!(
            "Growth Progress Server Configuration:\n\
             - HTTP: {}:{}\n\
             - Log Level: {}\n\
             - Insight Enrichment: {}\n\
             - Enrichment Timeout: {}s\n\
             - Progress Rules: {}",
            self.http_host,
            self.http_port,
            self.log_level,
            if self.enrichment.is_configured() { "Enabled" } else { "Disabled" },
            self.enrichment.timeout_seconds,
            self.progress_config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string())
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> Result<String> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_string()))
}

/// Get environment variable, treating blank values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
