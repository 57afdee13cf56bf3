// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Challenge difficulty classification from point values

use crate::constants::difficulty::{EASY_MAX_POINTS, MEDIUM_MAX_POINTS};
use serde::{Deserialize, Serialize};

/// Difficulty tier of a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// Inclusive upper bounds for the easy and medium tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyThresholds {
    pub easy_max: i64,
    pub medium_max: i64,
    // > medium_max = hard
}

impl Default for DifficultyThresholds {
    fn default() -> Self {
        Self {
            easy_max: EASY_MAX_POINTS,
            medium_max: MEDIUM_MAX_POINTS,
        }
    }
}

/// Classify a challenge by its point value using the default thresholds
pub fn classify(points: i64) -> Difficulty {
    classify_with(points, &DifficultyThresholds::default())
}

/// Classify a challenge by its point value. Boundary values fall into the easier tier.
pub fn classify_with(points: i64, thresholds: &DifficultyThresholds) -> Difficulty {
    match points {
        p if p <= thresholds.easy_max => Difficulty::Easy,
        p if p <= thresholds.medium_max => Difficulty::Medium,
        _ => Difficulty::Hard,
    }
}
