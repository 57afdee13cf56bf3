// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Request validation and handlers for the progress HTTP API

use crate::config::ProgressConfig;
use crate::logging::AppLogger;
use crate::models::{ChallengeRecord, PointEvent, ReflectionNote};
use crate::progress::aggregation::UnknownTimeframe;
use crate::progress::{
    aggregate, classify_with, evaluate_day, level_progress, Difficulty, LevelState, PeriodBucket,
    StreakState, StreakTransition, Timeframe, WeeklyInsightGenerator, WeeklyInsightReport,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Malformed input. Always answered with 400 and never retried.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Points must be an integer, got {0:?}")]
    InvalidPoints(String),

    #[error(transparent)]
    InvalidTimeframe(#[from] UnknownTimeframe),
}

impl RequestError {
    /// Stable error code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAnObject => "invalid_body",
            Self::MissingField(_) => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::InvalidPoints(_) => "invalid_points",
            Self::InvalidTimeframe(_) => "invalid_timeframe",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyResponse {
    pub points: i64,
    pub difficulty: Difficulty,
}

#[derive(Clone)]
pub struct ProgressRoutes {
    generator: Arc<WeeklyInsightGenerator>,
    config: ProgressConfig,
}

impl ProgressRoutes {
    pub fn new(generator: Arc<WeeklyInsightGenerator>, config: ProgressConfig) -> Self {
        Self { generator, config }
    }

    /// Handle `POST /insights/weekly`
    pub async fn weekly_insights(&self, body: Value) -> Result<WeeklyInsightReport, RequestError> {
        let object = body.as_object().ok_or(RequestError::NotAnObject)?;
        let notes: Vec<ReflectionNote> = required_array(object, "notes")?;
        let challenges: Vec<ChallengeRecord> = required_array(object, "challenges")?;

        info!(
            notes = notes.len(),
            challenges = challenges.len(),
            "Weekly insight request"
        );

        Ok(self.generator.generate(&notes, &challenges).await)
    }

    /// Handle `GET /progress/level/{points}`
    pub fn level(&self, points: &str) -> Result<LevelState, RequestError> {
        let points = parse_points(points)?;
        Ok(level_progress(points))
    }

    /// Handle `GET /challenges/difficulty/{points}`
    pub fn difficulty(&self, points: &str) -> Result<DifficultyResponse, RequestError> {
        let points = parse_points(points)?;
        Ok(DifficultyResponse {
            points,
            difficulty: classify_with(points, &self.config.difficulty),
        })
    }

    /// Handle `POST /progress/aggregate`
    pub fn aggregate(&self, body: Value) -> Result<Vec<PeriodBucket>, RequestError> {
        let object = body.as_object().ok_or(RequestError::NotAnObject)?;
        let events: Vec<PointEvent> = required_array(object, "events")?;
        let timeframe: Timeframe = object
            .get("timeframe")
            .ok_or(RequestError::MissingField("timeframe"))?
            .as_str()
            .ok_or_else(|| RequestError::InvalidField {
                field: "timeframe",
                reason: "expected a string".to_string(),
            })?
            .parse()?;

        debug!(events = events.len(), timeframe = %timeframe, "Aggregating point events");
        Ok(aggregate(&events, timeframe))
    }

    /// Handle `POST /streak/evaluate`
    pub fn evaluate_streak(&self, body: Value) -> Result<StreakTransition, RequestError> {
        let object = body.as_object().ok_or(RequestError::NotAnObject)?;
        let state: StreakState = required_field(object, "state")?;
        let today: NaiveDate = required_field(object, "today")?;
        let active_today: bool = required_field(object, "activeToday")?;

        let transition = evaluate_day(&state, today, active_today, &self.config.streak);
        if transition.state != state {
            AppLogger::log_streak_transition(&transition);
        }

        Ok(transition)
    }
}

fn parse_points(raw: &str) -> Result<i64, RequestError> {
    raw.trim()
        .parse()
        .map_err(|_| RequestError::InvalidPoints(raw.to_string()))
}

fn required_field<T: DeserializeOwned>(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<T, RequestError> {
    let value = object.get(field).ok_or(RequestError::MissingField(field))?;
    serde_json::from_value(value.clone()).map_err(|e| RequestError::InvalidField {
        field,
        reason: e.to_string(),
    })
}

fn required_array<T: DeserializeOwned>(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Vec<T>, RequestError> {
    match object.get(field) {
        None => Err(RequestError::MissingField(field)),
        Some(Value::Array(_)) => required_field(object, field),
        Some(_) => Err(RequestError::InvalidField {
            field,
            reason: "expected an array".to_string(),
        }),
    }
}
