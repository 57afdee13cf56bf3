// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Daily streak tracking with shield protection
//!
//! [`evaluate_day`] is the single transition applied once per calendar day:
//!
//! - activity on a day that follows the last covered day extends the streak
//! - a day without activity right after an activity day consumes one shield
//!   if one is available and keeps the streak at its current length
//! - anything else breaks the streak
//!
//! A shield covers exactly one missed day. Two missed days in a row always
//! break the streak, even with shields left. The caller persists the returned
//! state and guarantees one evaluation per user per day; shields are bought
//! through the wallet and only ever consumed here.

use crate::constants::streak::{
    BLAZE_MIN_DAYS, FLAME_MIN_DAYS, SHIELD_COST_COINS, SPARK_MIN_DAYS,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Presentation intensity of a streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireState {
    None,
    Spark,
    Flame,
    Blaze,
}

/// Minimum streak lengths for each fire state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireTiers {
    pub spark_min: u32,
    pub flame_min: u32,
    pub blaze_min: u32,
}

impl Default for FireTiers {
    fn default() -> Self {
        Self {
            spark_min: SPARK_MIN_DAYS,
            flame_min: FLAME_MIN_DAYS,
            blaze_min: BLAZE_MIN_DAYS,
        }
    }
}

impl FireTiers {
    /// Fire state for a streak length
    pub fn fire_state(&self, length: u32) -> FireState {
        match length {
            l if l >= self.blaze_min => FireState::Blaze,
            l if l >= self.flame_min => FireState::Flame,
            l if l >= self.spark_min => FireState::Spark,
            _ => FireState::None,
        }
    }
}

/// Shield pricing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldPolicy {
    /// Price of one shield in coins
    pub cost: u32,
}

impl Default for ShieldPolicy {
    fn default() -> Self {
        Self {
            cost: SHIELD_COST_COINS,
        }
    }
}

/// Streak tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default)]
    pub fire_tiers: FireTiers,
    #[serde(default)]
    pub shield_policy: ShieldPolicy,
}

/// Persisted streak state for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_length: u32,
    pub fire_state: FireState,
    pub shields_available: u32,
    pub last_activity_date: Option<NaiveDate>,
    /// Last day kept alive by a shield instead of activity
    #[serde(default)]
    pub last_protected_date: Option<NaiveDate>,
}

impl StreakState {
    /// A fresh state with no streak
    pub fn new(shields_available: u32) -> Self {
        Self {
            current_length: 0,
            fire_state: FireState::None,
            shields_available,
            last_activity_date: None,
            last_protected_date: None,
        }
    }

    /// Last day the streak was kept alive, by activity or by a shield
    fn last_covered_date(&self) -> Option<NaiveDate> {
        self.last_activity_date.max(self.last_protected_date)
    }

    fn covered_by_shield(&self, date: NaiveDate) -> bool {
        self.last_protected_date == Some(date) && self.last_activity_date != Some(date)
    }
}

/// Outcome of one day's evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreakStatus {
    Active {
        length: u32,
    },
    ShieldProtected {
        length: u32,
        #[serde(rename = "shieldsRemaining")]
        shields_remaining: u32,
    },
    Broken,
}

/// New state plus what happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakTransition {
    pub state: StreakState,
    pub status: StreakStatus,
    pub shield_consumed: bool,
}

/// Apply the transition for `today`
///
/// `active_today` tells whether the user logged qualifying activity on
/// `today`. Evaluating a day that is already covered returns the state
/// unchanged.
pub fn evaluate_day(
    state: &StreakState,
    today: NaiveDate,
    active_today: bool,
    config: &StreakConfig,
) -> StreakTransition {
    let days_since_covered = state
        .last_covered_date()
        .map(|covered| (today - covered).num_days());

    if matches!(days_since_covered, Some(days) if days <= 0) {
        return unchanged(state);
    }

    let mut next = state.clone();
    let mut shield_consumed = false;

    let status = if active_today {
        next.current_length = match days_since_covered {
            _ if state.current_length == 0 => 1,
            None => 1,
            Some(1) => state.current_length.saturating_add(1),
            Some(2) if can_protect_missed_day(state, today - Duration::days(1)) => {
                next.shields_available -= 1;
                next.last_protected_date = Some(today - Duration::days(1));
                shield_consumed = true;
                state.current_length.saturating_add(1)
            }
            Some(_) => 1,
        };
        next.last_activity_date = Some(today);
        StreakStatus::Active {
            length: next.current_length,
        }
    } else if state.current_length > 0
        && days_since_covered == Some(1)
        && can_protect_missed_day(state, today)
    {
        next.shields_available -= 1;
        next.last_protected_date = Some(today);
        shield_consumed = true;
        StreakStatus::ShieldProtected {
            length: next.current_length,
            shields_remaining: next.shields_available,
        }
    } else {
        next.current_length = 0;
        StreakStatus::Broken
    };

    next.fire_state = config.fire_tiers.fire_state(next.current_length);

    StreakTransition {
        state: next,
        status,
        shield_consumed,
    }
}

/// A missed day can be protected when a shield is available and the day
/// before it was an activity day. Shields never chain.
fn can_protect_missed_day(state: &StreakState, missed_day: NaiveDate) -> bool {
    state.shields_available > 0
        && state.current_length > 0
        && state.last_activity_date == Some(missed_day - Duration::days(1))
}

fn unchanged(state: &StreakState) -> StreakTransition {
    let status = match state.last_covered_date() {
        Some(date) if state.covered_by_shield(date) => StreakStatus::ShieldProtected {
            length: state.current_length,
            shields_remaining: state.shields_available,
        },
        _ if state.current_length == 0 => StreakStatus::Broken,
        _ => StreakStatus::Active {
            length: state.current_length,
        },
    };

    StreakTransition {
        state: state.clone(),
        status,
        shield_consumed: false,
    }
}

/// Rebuild a streak state by replaying activity dates day by day up to `today`
///
/// `today` is only evaluated when it already has activity, since the day is
/// still open otherwise. Dates after `today` are ignored.
pub fn streak_from_history(
    activity_dates: &[NaiveDate],
    today: NaiveDate,
    shields_available: u32,
    config: &StreakConfig,
) -> StreakState {
    let dates: BTreeSet<NaiveDate> = activity_dates
        .iter()
        .copied()
        .filter(|date| *date <= today)
        .collect();

    let mut state = StreakState::new(shields_available);
    let Some(first) = dates.iter().next().copied() else {
        return state;
    };

    let last_day = if dates.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut day = first;
    while day <= last_day {
        state = evaluate_day(&state, day, dates.contains(&day), config).state;
        day += Duration::days(1);
    }

    state
}

/// Price of a shield and whether a wallet balance covers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldQuote {
    pub cost: u32,
    pub affordable: bool,
}

/// Quote a shield purchase against a wallet balance
pub fn quote_shield(balance: u32, policy: &ShieldPolicy) -> ShieldQuote {
    ShieldQuote {
        cost: policy.cost,
        affordable: balance >= policy.cost,
    }
}
