// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Level curve, level titles and progress within a level
//!
//! The curve is quadratic: reaching level `L` requires `50 * L * (L - 1)`
//! accumulated points, so each level costs 100 points more than the previous
//! one. Levels are always derived from the point total and never stored.

use crate::constants::leveling::{
    BASE_TITLES, FIRST_PRESTIGE_LEVEL, INVERSE_DIVISOR, LEVELS_PER_PRESTIGE_TIER,
    POINTS_PER_LEVEL_STEP, PRESTIGE_TITLES,
};
use crate::models::PointEvent;
use serde::{Deserialize, Serialize};

/// Level information derived from a point total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelState {
    pub level: u32,
    pub title: String,
    /// Points at which the current level starts
    pub threshold_for_level: i64,
    /// Points at which the next level starts
    pub threshold_for_next_level: i64,
    pub points_into_level: i64,
    /// Progress through the current level, always within `[0, 1]`
    pub progress_fraction: f64,
    pub points_to_next: i64,
}

/// Exact threshold in 128-bit arithmetic so every `u32` level is representable
fn exact_threshold(level: u32) -> i128 {
    let level = i128::from(level.max(1));
    i128::from(POINTS_PER_LEVEL_STEP) * level * (level - 1)
}

/// Minimum accumulated points required to reach `level`. Level 0 is treated as level 1.
pub fn threshold_for_level(level: u32) -> i64 {
    i64::try_from(exact_threshold(level)).unwrap_or(i64::MAX)
}

/// Level reached with `points` accumulated points
///
/// Uses the closed-form inverse of the threshold curve and then corrects the
/// estimate against the exact integer thresholds, so floating-point rounding
/// at exact threshold values never produces an off-by-one level.
pub fn level_for_points(points: i64) -> u32 {
    if points <= 0 {
        return 1;
    }

    let estimate = ((1.0 + (1.0 + points as f64 / INVERSE_DIVISOR).sqrt()) / 2.0).floor();
    let mut level = (estimate as u32).max(1);
    let points = i128::from(points);

    while level > 1 && exact_threshold(level) > points {
        level -= 1;
    }
    while level < u32::MAX && exact_threshold(level + 1) <= points {
        level += 1;
    }

    level
}

/// Title shown for a level
///
/// Levels 1-9 use the base titles. From level 10 on, titles cycle through the
/// prestige list in tiers of ten levels; tiers after the first carry a Roman
/// numeral suffix (`"Ascendant II"` at level 20).
pub fn title_for_level(level: u32) -> String {
    let level = level.max(1);

    if level < FIRST_PRESTIGE_LEVEL {
        return BASE_TITLES[(level - 1) as usize].to_string();
    }

    let prestige_level = level - (FIRST_PRESTIGE_LEVEL - 1);
    let tier = (prestige_level - 1) / LEVELS_PER_PRESTIGE_TIER + 1;
    let title = PRESTIGE_TITLES[((prestige_level - 1) % LEVELS_PER_PRESTIGE_TIER) as usize];

    if tier > 1 {
        format!("{} {}", title, to_roman(tier))
    } else {
        title.to_string()
    }
}

/// Full level record for a point total. Negative totals are treated as zero.
pub fn level_progress(points: i64) -> LevelState {
    let points = points.max(0);
    let level = level_for_points(points);
    let threshold = threshold_for_level(level);
    let next_threshold = threshold_for_level(level.saturating_add(1));

    let span = next_threshold.saturating_sub(threshold);
    let points_into_level = points.saturating_sub(threshold);
    let progress_fraction = if span > 0 {
        (points_into_level as f64 / span as f64).clamp(0.0, 1.0)
    } else {
        1.0
    };

    LevelState {
        level,
        title: title_for_level(level),
        threshold_for_level: threshold,
        threshold_for_next_level: next_threshold,
        points_into_level,
        progress_fraction,
        points_to_next: next_threshold.saturating_sub(points).max(0),
    }
}

/// Sum of all point grants in an event log
pub fn total_points(events: &[PointEvent]) -> i64 {
    events
        .iter()
        .fold(0i64, |total, event| total.saturating_add(event.amount))
}

/// Roman numeral for a positive number
fn to_roman(mut value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut numeral = String::new();
    for &(amount, symbol) in NUMERALS.iter() {
        while value >= amount {
            numeral.push_str(symbol);
            value -= amount;
        }
    }
    numeral
}
