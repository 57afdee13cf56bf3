// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP server exposing the progress calculators and weekly insights

use crate::config::{ProgressConfig, ServerConfig};
use crate::constants::routes::{
    CHALLENGES_BASE, CHALLENGES_DIFFICULTY, INSIGHTS_BASE, INSIGHTS_WEEKLY, PROGRESS_AGGREGATE,
    PROGRESS_BASE, PROGRESS_LEVEL, STREAK_BASE, STREAK_EVALUATE,
};
use crate::health::{middleware, HealthChecker};
use crate::logging::AppLogger;
use crate::progress::WeeklyInsightGenerator;
use crate::routes::{ErrorResponse, ProgressRoutes, RequestError};
use anyhow::{Context, Result};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use warp::{Filter, Reply};

/// Growth progress HTTP server
pub struct ProgressServer {
    config: ServerConfig,
    progress: ProgressConfig,
    generator: Arc<WeeklyInsightGenerator>,
}

impl ProgressServer {
    pub fn new(config: ServerConfig, progress: ProgressConfig, generator: WeeklyInsightGenerator) -> Self {
        Self {
            config,
            progress,
            generator: Arc::new(generator),
        }
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.http_host, self.config.http_port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid bind address {}:{}",
                    self.config.http_host, self.config.http_port
                )
            })?;

        info!(
            "HTTP server starting on {} (insight enrichment {})",
            addr,
            if self.generator.has_enrichment() { "enabled" } else { "disabled" }
        );

        let progress_routes = ProgressRoutes::new(self.generator.clone(), self.progress.clone());
        let health_checker = HealthChecker::new(self.config.enrichment.clone(), self.progress.clone());
        let routes = routes(progress_routes, health_checker);

        let (bound, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(addr, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
            })
            .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

        info!("HTTP server ready on {}", bound);
        server.await;
        info!("HTTP server stopped");

        Ok(())
    }
}

/// All HTTP routes with CORS, request logging and JSON error replies
pub fn routes(
    progress_routes: ProgressRoutes,
    health_checker: HealthChecker,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "OPTIONS"]);

    // Weekly insight report
    let weekly = warp::path(INSIGHTS_BASE)
        .and(warp::path(INSIGHTS_WEEKLY))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and_then({
            let progress_routes = progress_routes.clone();
            move |body: Value| {
                let progress_routes = progress_routes.clone();
                async move {
                    match progress_routes.weekly_insights(body).await {
                        Ok(report) => Ok(warp::reply::json(&report)),
                        Err(e) => Err(reject(e)),
                    }
                }
            }
        });

    // Level for a point total
    let level = warp::path(PROGRESS_BASE)
        .and(warp::path(PROGRESS_LEVEL))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and_then({
            let progress_routes = progress_routes.clone();
            move |points: String| {
                let progress_routes = progress_routes.clone();
                async move {
                    progress_routes
                        .level(&points)
                        .map(|state| warp::reply::json(&state))
                        .map_err(reject)
                }
            }
        });

    // Difficulty tier for a challenge point value
    let difficulty = warp::path(CHALLENGES_BASE)
        .and(warp::path(CHALLENGES_DIFFICULTY))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and_then({
            let progress_routes = progress_routes.clone();
            move |points: String| {
                let progress_routes = progress_routes.clone();
                async move {
                    progress_routes
                        .difficulty(&points)
                        .map(|response| warp::reply::json(&response))
                        .map_err(reject)
                }
            }
        });

    // Period aggregation
    let aggregate = warp::path(PROGRESS_BASE)
        .and(warp::path(PROGRESS_AGGREGATE))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and_then({
            let progress_routes = progress_routes.clone();
            move |body: Value| {
                let progress_routes = progress_routes.clone();
                async move {
                    progress_routes
                        .aggregate(body)
                        .map(|buckets| warp::reply::json(&buckets))
                        .map_err(reject)
                }
            }
        });

    // Streak transition
    let streak = warp::path(STREAK_BASE)
        .and(warp::path(STREAK_EVALUATE))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and_then(move |body: Value| {
            let progress_routes = progress_routes.clone();
            async move {
                progress_routes
                    .evaluate_streak(body)
                    .map(|transition| warp::reply::json(&transition))
                    .map_err(reject)
            }
        });

    let request_log = warp::log::custom(|info| {
        AppLogger::log_api_request(
            info.method().as_str(),
            info.path(),
            info.status().as_u16(),
            info.elapsed().as_millis() as u64,
        );
    });

    weekly
        .or(level)
        .or(difficulty)
        .or(aggregate)
        .or(streak)
        .or(middleware::routes(health_checker))
        .with(cors)
        .recover(handle_rejection)
        .with(request_log)
}

/// HTTP API error wrapper
#[derive(Debug)]
struct ApiError(ErrorResponse);

impl warp::reject::Reject for ApiError {}

fn reject(error: RequestError) -> warp::Rejection {
    warp::reject::custom(ApiError(error.to_response()))
}

/// Handle HTTP rejections and errors
async fn handle_rejection(err: warp::Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(api_error) = err.find::<ApiError>() {
        (warp::http::StatusCode::BAD_REQUEST, api_error.0.clone())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            warp::http::StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: "invalid_body".to_string(),
                message: e.to_string(),
            },
        )
    } else if err.is_not_found() {
        (
            warp::http::StatusCode::NOT_FOUND,
            ErrorResponse {
                error: "Not Found".to_string(),
                message: "The requested endpoint was not found".to_string(),
            },
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            warp::http::StatusCode::METHOD_NOT_ALLOWED,
            ErrorResponse {
                error: "Method Not Allowed".to_string(),
                message: "The endpoint does not support this method".to_string(),
            },
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse {
                error: "Internal Server Error".to_string(),
                message: "Something went wrong".to_string(),
            },
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
