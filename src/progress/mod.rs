// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Progress Module
//!
//! Gamification rules that turn journaling activity into progress signals.
//!
//! This module includes:
//! - Challenge difficulty classification
//! - Level curve, titles and progress within a level
//! - Daily streak tracking with shield protection
//! - Calendar-aligned point aggregation
//! - Weekly insight reports with best-effort AI enrichment
//!
//! Everything except the insight generator is a pure function over plain data.

pub mod aggregation;
pub mod difficulty;
pub mod enrichment;
pub mod insights;
pub mod leveling;
pub mod streak;

pub use aggregation::{aggregate, aggregate_in, PeriodBucket, Timeframe};
pub use difficulty::{classify, classify_with, Difficulty, DifficultyThresholds};
pub use enrichment::{HttpTextGenerationClient, TextGenerationClient};
pub use insights::{WeeklyInsightGenerator, WeeklyInsightReport};
pub use leveling::{level_for_points, level_progress, threshold_for_level, title_for_level, LevelState};
pub use streak::{evaluate_day, StreakConfig, StreakState, StreakStatus, StreakTransition};
