// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Text-generation service client and response validation for weekly insights

use super::insights::{InsightPattern, Recommendation};
use crate::config::environment::EnrichmentConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Longest error body kept from a failed response
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Request body sent to the text-generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest {
    pub prompt: String,
    pub notes: Vec<NoteExcerpt>,
    pub challenges: Vec<ChallengeSummary>,
}

/// Truncated reflection embedded in the request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteExcerpt {
    pub title: String,
    pub excerpt: String,
    pub created_at: DateTime<Utc>,
}

/// Challenge line embedded in the request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSummary {
    pub title: String,
    pub points: i64,
    pub completed: bool,
    pub difficulty: super::Difficulty,
}

/// Narrative produced by the text-generation service after validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsights {
    pub summary: String,
    pub patterns: Vec<InsightPattern>,
    pub recommendations: Vec<Recommendation>,
}

/// Reasons enrichment can fail. None of these reach API callers.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Text generation service is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Text generation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response does not match the insight schema: {0}")]
    Schema(String),
}

impl EnrichmentError {
    /// Short machine-readable reason for logs
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Network(e) if e.is_timeout() => "timeout",
            Self::Network(_) => "network",
            Self::Status { .. } => "http_status",
            Self::Parse(_) => "parse",
            Self::Schema(_) => "schema",
        }
    }
}

/// A service that turns an insight request into a raw JSON response body
#[async_trait]
pub trait TextGenerationClient: Send + Sync {
    /// Send one request and return the raw response body. No retries.
    async fn generate(&self, request: &EnrichmentRequest) -> Result<String, EnrichmentError>;

    /// Name used in logs
    fn service_name(&self) -> &str;
}

/// Text-generation service reached over HTTP with a bearer credential
pub struct HttpTextGenerationClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTextGenerationClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from configuration; `None` when endpoint or key is missing
    pub fn from_config(config: &EnrichmentConfig) -> Result<Option<Self>, EnrichmentError> {
        match (&config.api_url, &config.api_key) {
            (Some(url), Some(key)) => Ok(Some(Self::new(
                url.clone(),
                key.clone(),
                Duration::from_secs(config.timeout_seconds),
            )?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl TextGenerationClient for HttpTextGenerationClient {
    async fn generate(&self, request: &EnrichmentRequest) -> Result<String, EnrichmentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EnrichmentError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(body)
    }

    fn service_name(&self) -> &str {
        "http"
    }
}

/// Validate a raw response body against the insight schema
///
/// The body must be a JSON object with a non-empty `summary` string and
/// `patterns` / `recommendations` arrays whose entries all decode. Any
/// violation rejects the whole response; nothing is repaired. Empty arrays
/// are well-formed.
pub fn parse_insight_response(body: &str) -> Result<AiInsights, EnrichmentError> {
    let value: Value = serde_json::from_str(body)?;
    let object = value
        .as_object()
        .ok_or_else(|| EnrichmentError::Schema("expected a JSON object".to_string()))?;

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|summary| !summary.is_empty())
        .ok_or_else(|| {
            EnrichmentError::Schema("summary must be a non-empty string".to_string())
        })?
        .to_string();

    let patterns = decode_array::<InsightPattern>(object.get("patterns"), "patterns")?;
    let recommendations =
        decode_array::<Recommendation>(object.get("recommendations"), "recommendations")?;

    Ok(AiInsights {
        summary,
        patterns,
        recommendations,
    })
}

fn decode_array<T: serde::de::DeserializeOwned>(
    value: Option<&Value>,
    field: &str,
) -> Result<Vec<T>, EnrichmentError> {
    match value {
        Some(array @ Value::Array(_)) => serde_json::from_value(array.clone())
            .map_err(|e| EnrichmentError::Schema(format!("invalid {} entry: {}", field, e))),
        _ => Err(EnrichmentError::Schema(format!("{} must be an array", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::insights::PatternType;

    #[test]
    fn test_parse_valid_response() {
        let body = r#"{
            "summary": "A reflective week with steady effort.",
            "patterns": [
                {"type": "positive", "title": "Morning writing", "description": "Most reflections happen before 9am."},
                {"type": "negative", "title": "Skipped hard challenges", "description": "Hard challenges were left open."}
            ],
            "recommendations": [
                {"title": "Pair reflection with a challenge", "description": "Pick one challenge right after writing."}
            ]
        }"#;

        let insights = parse_insight_response(body).unwrap();

        assert_eq!(insights.summary, "A reflective week with steady effort.");
        assert_eq!(insights.patterns.len(), 2);
        assert_eq!(insights.patterns[0].pattern_type, PatternType::Positive);
        assert_eq!(insights.recommendations.len(), 1);
    }

    #[test]
    fn test_empty_arrays_are_well_formed() {
        let body = r#"{"summary": "Quiet week.", "patterns": [], "recommendations": []}"#;

        let insights = parse_insight_response(body).unwrap();
        assert!(insights.patterns.is_empty());
        assert!(insights.recommendations.is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = parse_insight_response("Here is your summary: great week!");
        assert!(matches!(result, Err(EnrichmentError::Parse(_))));
    }

    #[test]
    fn test_missing_or_blank_summary_is_rejected() {
        let missing = parse_insight_response(r#"{"patterns": [], "recommendations": []}"#);
        let blank = parse_insight_response(r#"{"summary": "  ", "patterns": [], "recommendations": []}"#);

        assert!(matches!(missing, Err(EnrichmentError::Schema(_))));
        assert!(matches!(blank, Err(EnrichmentError::Schema(_))));
    }

    #[test]
    fn test_non_array_fields_are_rejected() {
        let result = parse_insight_response(
            r#"{"summary": "ok", "patterns": "none", "recommendations": []}"#,
        );

        match result {
            Err(EnrichmentError::Schema(message)) => assert!(message.contains("patterns")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_one_bad_entry_rejects_everything() {
        let result = parse_insight_response(
            r#"{
                "summary": "ok",
                "patterns": [{"type": "mixed", "title": "t", "description": "d"}],
                "recommendations": []
            }"#,
        );

        assert!(matches!(result, Err(EnrichmentError::Schema(_))));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let result = parse_insight_response(r#"["summary"]"#);
        assert!(matches!(result, Err(EnrichmentError::Schema(_))));
    }

    #[test]
    fn test_from_config_requires_url_and_key() {
        let mut config = EnrichmentConfig::default();
        assert!(HttpTextGenerationClient::from_config(&config).unwrap().is_none());

        config.api_url = Some("https://insights.example.com/v1/weekly".to_string());
        assert!(HttpTextGenerationClient::from_config(&config).unwrap().is_none());

        config.api_key = Some("secret".to_string());
        assert!(HttpTextGenerationClient::from_config(&config).unwrap().is_some());
    }

    #[test]
    fn test_error_reasons() {
        assert_eq!(EnrichmentError::NotConfigured.reason(), "not_configured");
        assert_eq!(
            EnrichmentError::Status {
                status: 502,
                body: String::new()
            }
            .reason(),
            "http_status"
        );
        assert_eq!(EnrichmentError::Schema("x".into()).reason(), "schema");
    }
}
