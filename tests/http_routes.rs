// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! HTTP API tests driven through the warp filter

use growth_progress::config::{EnrichmentConfig, ProgressConfig};
use growth_progress::health::HealthChecker;
use growth_progress::progress::WeeklyInsightGenerator;
use growth_progress::routes::ProgressRoutes;
use growth_progress::server;
use serde_json::{json, Value};
use std::sync::Arc;
use warp::Filter;
use warp::Reply;

fn api() -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone + 'static {
    let progress = ProgressConfig::default();
    let routes = ProgressRoutes::new(
        Arc::new(WeeklyInsightGenerator::without_enrichment()),
        progress.clone(),
    );
    server::routes(routes, HealthChecker::new(EnrichmentConfig::default(), progress))
}

fn body_json(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn test_level_endpoint() {
    let response = warp::test::request()
        .method("GET")
        .path("/progress/level/450")
        .reply(&api())
        .await;

    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["level"], 3);
    assert_eq!(body["title"], "Sapling");
    assert_eq!(body["thresholdForLevel"], 300);
    assert_eq!(body["thresholdForNextLevel"], 600);
    assert_eq!(body["pointsToNext"], 150);
}

#[tokio::test]
async fn test_non_numeric_points_is_bad_request() {
    let response = warp::test::request()
        .method("GET")
        .path("/progress/level/lots")
        .reply(&api())
        .await;

    assert_eq!(response.status(), 400);
    let body = body_json(&response);
    assert_eq!(body["error"], "invalid_points");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_difficulty_endpoint() {
    let response = warp::test::request()
        .method("GET")
        .path("/challenges/difficulty/36")
        .reply(&api())
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_json(&response), json!({"points": 36, "difficulty": "hard"}));
}

#[tokio::test]
async fn test_weekly_insights_endpoint() {
    let response = warp::test::request()
        .method("POST")
        .path("/insights/weekly")
        .json(&json!({
            "notes": [],
            "challenges": [
                {"title": "Stretch", "points": 15, "completed": true, "createdAt": "2026-10-13T07:00:00Z"}
            ]
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["enriched"], false);
    assert_eq!(body["stats"]["completionRate"], 100);
    assert_eq!(body["stats"]["totalPointsEarned"], 15);
    assert_eq!(body["patterns"], json!([]));
}

#[tokio::test]
async fn test_weekly_insights_rejects_malformed_notes() {
    let response = warp::test::request()
        .method("POST")
        .path("/insights/weekly")
        .json(&json!({"notes": {"title": "not a list"}, "challenges": []}))
        .reply(&api())
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body_json(&response)["error"], "invalid_field");
}

#[tokio::test]
async fn test_invalid_json_body_is_bad_request() {
    let response = warp::test::request()
        .method("POST")
        .path("/progress/aggregate")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&api())
        .await;

    assert_eq!(response.status(), 400);
    assert_eq!(body_json(&response)["error"], "invalid_body");
}

#[tokio::test]
async fn test_aggregate_endpoint() {
    let response = warp::test::request()
        .method("POST")
        .path("/progress/aggregate")
        .json(&json!({
            "events": [
                {"amount": 20, "occurredAt": "2026-03-10T12:00:00Z"},
                {"amount": 30, "occurredAt": "2026-03-12T12:00:00Z"}
            ],
            "timeframe": "monthly"
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    let buckets = body.as_array().unwrap();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0]["total"], 50);
    assert_eq!(buckets[0]["label"], "Mar 2026");
}

#[tokio::test]
async fn test_streak_endpoint_consumes_shield() {
    let response = warp::test::request()
        .method("POST")
        .path("/streak/evaluate")
        .json(&json!({
            "state": {
                "currentLength": 8,
                "fireState": "flame",
                "shieldsAvailable": 2,
                "lastActivityDate": "2026-10-18"
            },
            "today": "2026-10-19",
            "activeToday": false
        }))
        .reply(&api())
        .await;

    assert_eq!(response.status(), 200);
    let body = body_json(&response);
    assert_eq!(body["status"]["status"], "shield_protected");
    assert_eq!(body["status"]["shieldsRemaining"], 1);
    assert_eq!(body["shieldConsumed"], true);
    assert_eq!(body["state"]["currentLength"], 8);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let response = warp::test::request()
        .method("GET")
        .path("/progress/unknown")
        .reply(&api())
        .await;

    assert_eq!(response.status(), 404);
    assert_eq!(body_json(&response)["error"], "Not Found");
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let response = warp::test::request()
        .method("GET")
        .path("/ready")
        .reply(&api())
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(body_json(&response)["status"], "healthy");
}
