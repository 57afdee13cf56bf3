// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Plain data exchanged between the journaling app and the progress engine.
//! Everything here is owned by the caller (activity log, challenge list) and
//! read-only to the calculators; derived records live next to the calculator
//! that produces them.
//!
//! ## Core Models
//!
//! - [`PointEvent`]: a single grant of points
//! - [`ReflectionNote`]: a written reflection
//! - [`ChallengeRecord`]: a challenge and whether it was completed
//!
//! All models serialize with camelCase field names to match the app's JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An atomic grant of points tied to a completed challenge or reflection
///
/// # Examples
///
/// ```rust
/// use growth_progress::models::PointEvent;
/// use chrono::Utc;
///
/// let event = PointEvent::new(30, Utc::now());
/// assert_eq!(event.amount, 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEvent {
    /// Points granted (may be negative for corrections)
    pub amount: i64,
    /// When the points were granted
    pub occurred_at: DateTime<Utc>,
}

impl PointEvent {
    pub fn new(amount: i64, occurred_at: DateTime<Utc>) -> Self {
        Self { amount, occurred_at }
    }
}

/// A reflection written by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionNote {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A challenge taken on by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRecord {
    pub title: String,
    /// Points awarded on completion
    pub points: i64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_event_uses_camel_case() {
        let event: PointEvent = serde_json::from_value(json!({
            "amount": 15,
            "occurredAt": "2026-10-19T08:30:00Z"
        }))
        .unwrap();

        assert_eq!(event.amount, 15);
        assert_eq!(event.occurred_at.to_rfc3339(), "2026-10-19T08:30:00+00:00");
    }

    #[test]
    fn test_challenge_record_deserialization() {
        let challenge: ChallengeRecord = serde_json::from_value(json!({
            "title": "Meditate for ten minutes",
            "points": 30,
            "completed": true,
            "createdAt": "2026-10-14T07:00:00Z"
        }))
        .unwrap();

        assert!(challenge.completed);
        assert_eq!(challenge.points, 30);
    }

    #[test]
    fn test_reflection_note_requires_content() {
        let result: Result<ReflectionNote, _> = serde_json::from_value(json!({
            "title": "Morning pages",
            "createdAt": "2026-10-14T07:00:00Z"
        }));

        assert!(result.is_err());
    }
}
