// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Health check endpoints and monitoring utilities

use crate::config::{EnrichmentConfig, ProgressConfig};
use crate::constants::service::{service_name, SERVICE_VERSION};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{error, info};

/// Overall health status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// Service information
    pub service: ServiceInfo,
    /// Individual component checks
    pub checks: Vec<ComponentHealth>,
    /// Response timestamp
    pub timestamp: u64,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Service information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    /// Environment (development, staging, production)
    pub environment: String,
    pub uptime_seconds: u64,
}

/// Individual component health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    /// Check duration in milliseconds
    pub duration_ms: u64,
    pub metadata: Option<serde_json::Value>,
}

/// Health checker for the growth progress server
pub struct HealthChecker {
    start_time: Instant,
    enrichment: EnrichmentConfig,
    progress: ProgressConfig,
    cached_status: RwLock<Option<(HealthResponse, Instant)>>,
    cache_ttl: Duration,
}

impl HealthChecker {
    pub fn new(enrichment: EnrichmentConfig, progress: ProgressConfig) -> Self {
        Self {
            start_time: Instant::now(),
            enrichment,
            progress,
            cached_status: RwLock::new(None),
            cache_ttl: Duration::from_secs(30),
        }
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo {
            name: service_name(),
            version: SERVICE_VERSION.to_string(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "unknown".to_string()),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Perform a basic health check (fast, suitable for load balancer probes)
    pub async fn basic_health(&self) -> HealthResponse {
        let start = Instant::now();

        let checks = vec![ComponentHealth {
            name: "service".to_string(),
            status: HealthStatus::Healthy,
            message: "Service is running".to_string(),
            duration_ms: 0,
            metadata: None,
        }];

        HealthResponse {
            status: HealthStatus::Healthy,
            service: self.service_info(),
            checks,
            timestamp: unix_now(),
            response_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Perform a comprehensive health check with all components
    pub async fn comprehensive_health(&self) -> HealthResponse {
        let start = Instant::now();

        {
            let cached = self.cached_status.read().await;
            if let Some((response, cached_at)) = cached.as_ref() {
                if cached_at.elapsed() < self.cache_ttl {
                    return response.clone();
                }
            }
        }

        info!("Performing comprehensive health check");

        let checks = vec![self.check_progress_rules(), self.check_enrichment()];

        let response = HealthResponse {
            status: overall_status(&checks),
            service: self.service_info(),
            checks,
            timestamp: unix_now(),
            response_time_ms: start.elapsed().as_millis() as u64,
        };

        {
            let mut cached = self.cached_status.write().await;
            *cached = Some((response.clone(), Instant::now()));
        }

        response
    }

    /// Progress rules must be internally consistent to serve requests
    fn check_progress_rules(&self) -> ComponentHealth {
        let start = Instant::now();

        match self.progress.validate() {
            Ok(()) => ComponentHealth {
                name: "progress_rules".to_string(),
                status: HealthStatus::Healthy,
                message: "Progress rules loaded".to_string(),
                duration_ms: start.elapsed().as_millis() as u64,
                metadata: Some(serde_json::json!({
                    "difficulty": self.progress.difficulty,
                    "fire_tiers": self.progress.streak.fire_tiers,
                    "shield_cost": self.progress.streak.shield_policy.cost,
                })),
            },
            Err(e) => {
                error!("Progress rules check failed: {}", e);
                ComponentHealth {
                    name: "progress_rules".to_string(),
                    status: HealthStatus::Unhealthy,
                    message: format!("Progress rules are invalid: {}", e),
                    duration_ms: start.elapsed().as_millis() as u64,
                    metadata: None,
                }
            }
        }
    }

    /// Missing enrichment only degrades weekly insights to the template
    fn check_enrichment(&self) -> ComponentHealth {
        let (status, message) = if self.enrichment.is_configured() {
            (HealthStatus::Healthy, "Text generation service configured")
        } else {
            (
                HealthStatus::Degraded,
                "Text generation service not configured; weekly insights use the deterministic summary",
            )
        };

        ComponentHealth {
            name: "insight_enrichment".to_string(),
            status,
            message: message.to_string(),
            duration_ms: 0,
            metadata: Some(serde_json::json!({
                "timeout_seconds": self.enrichment.timeout_seconds,
                "max_notes": self.enrichment.max_notes,
            })),
        }
    }

    /// Get readiness status (for Kubernetes readiness probes)
    pub async fn readiness(&self) -> HealthResponse {
        let mut response = self.basic_health().await;

        let rules_check = self.check_progress_rules();
        response.checks.push(rules_check.clone());

        response.status = if rules_check.status == HealthStatus::Healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

        response
    }

    /// Get liveness status (for Kubernetes liveness probes)
    pub async fn liveness(&self) -> HealthResponse {
        self.basic_health().await
    }
}

fn overall_status(checks: &[ComponentHealth]) -> HealthStatus {
    if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Health check middleware for HTTP endpoints
pub mod middleware {
    use super::*;
    use std::sync::Arc;
    use warp::{Filter, Reply};

    /// Create health check routes
    pub fn routes(
        health_checker: HealthChecker,
    ) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        let health_checker = Arc::new(health_checker);

        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_health_checker(health_checker.clone()))
            .and_then(health_handler);

        let ready = warp::path("ready")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_health_checker(health_checker.clone()))
            .and_then(readiness_handler);

        let live = warp::path("live")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_health_checker(health_checker))
            .and_then(liveness_handler);

        health.or(ready).or(live)
    }

    fn with_health_checker(
        health_checker: Arc<HealthChecker>,
    ) -> impl Filter<Extract = (Arc<HealthChecker>,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || health_checker.clone())
    }

    async fn health_handler(health_checker: Arc<HealthChecker>) -> Result<impl Reply, warp::Rejection> {
        let response = health_checker.comprehensive_health().await;
        let status_code = match response.status {
            HealthStatus::Healthy | HealthStatus::Degraded => warp::http::StatusCode::OK,
            HealthStatus::Unhealthy => warp::http::StatusCode::SERVICE_UNAVAILABLE,
        };

        Ok(warp::reply::with_status(warp::reply::json(&response), status_code))
    }

    async fn readiness_handler(
        health_checker: Arc<HealthChecker>,
    ) -> Result<impl Reply, warp::Rejection> {
        let response = health_checker.readiness().await;
        let status_code = match response.status {
            HealthStatus::Healthy => warp::http::StatusCode::OK,
            _ => warp::http::StatusCode::SERVICE_UNAVAILABLE,
        };

        Ok(warp::reply::with_status(warp::reply::json(&response), status_code))
    }

    async fn liveness_handler(
        health_checker: Arc<HealthChecker>,
    ) -> Result<impl Reply, warp::Rejection> {
        let response = health_checker.liveness().await;
        Ok(warp::reply::json(&response))
    }
}
