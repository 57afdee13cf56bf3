// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Progression formula constants, title tables and environment-based defaults.

/// Service identity
pub mod service {
    use std::env;

    /// Service name used in logs and health responses
    pub const SERVICE_NAME: &str = "growth-progress-server";

    /// Service version from Cargo.toml
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Get service name from environment or default
    pub fn service_name() -> String {
        env::var("SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string())
    }
}

/// Leveling curve and title tables
pub mod leveling {
    /// `threshold(level) = POINTS_PER_LEVEL_STEP * level * (level - 1)`
    pub const POINTS_PER_LEVEL_STEP: i64 = 50;

    /// Divisor inside the closed-form inverse, `POINTS_PER_LEVEL_STEP / 4`
    pub const INVERSE_DIVISOR: f64 = 12.5;

    /// First level that uses the prestige title table
    pub const FIRST_PRESTIGE_LEVEL: u32 = 10;

    /// Levels per prestige tier
    pub const LEVELS_PER_PRESTIGE_TIER: u32 = 10;

    /// Titles for levels 1 through 9
    pub const BASE_TITLES: [&str; 9] = [
        "Seedling",
        "Sprout",
        "Sapling",
        "Explorer",
        "Seeker",
        "Pathfinder",
        "Trailblazer",
        "Sage",
        "Luminary",
    ];

    /// Titles cycled through within each prestige tier
    pub const PRESTIGE_TITLES: [&str; 10] = [
        "Ascendant",
        "Visionary",
        "Illuminated",
        "Mentor",
        "Guardian",
        "Oracle",
        "Transcendent",
        "Enlightened",
        "Master",
        "Legend",
    ];
}

/// Challenge difficulty boundaries (inclusive upper bounds)
pub mod difficulty {
    /// Highest point value still classified as easy
    pub const EASY_MAX_POINTS: i64 = 25;

    /// Highest point value still classified as medium
    pub const MEDIUM_MAX_POINTS: i64 = 35;
}

/// Streak presentation tiers and shield economy defaults
pub mod streak {
    /// Minimum streak length shown as a spark
    pub const SPARK_MIN_DAYS: u32 = 1;

    /// Minimum streak length shown as a flame
    pub const FLAME_MIN_DAYS: u32 = 7;

    /// Minimum streak length shown as a blaze
    pub const BLAZE_MIN_DAYS: u32 = 30;

    /// Price of one streak shield in coins
    pub const SHIELD_COST_COINS: u32 = 50;
}

/// Weekly insight prompt limits
pub mod insights {
    /// Characters kept from each reflection when building the prompt
    pub const DEFAULT_EXCERPT_CHARS: usize = 200;

    /// Reflections embedded in a single prompt
    pub const DEFAULT_MAX_NOTES: usize = 20;

    /// Outbound request timeout for the text-generation service
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

    /// Pattern count requested from the model
    pub const PATTERNS_MIN: usize = 2;
    pub const PATTERNS_MAX: usize = 4;

    /// Recommendation count requested from the model
    pub const RECOMMENDATIONS_MIN: usize = 2;
    pub const RECOMMENDATIONS_MAX: usize = 3;
}

/// HTTP routes and paths
pub mod routes {
    pub const INSIGHTS_BASE: &str = "insights";
    pub const INSIGHTS_WEEKLY: &str = "weekly";

    pub const PROGRESS_BASE: &str = "progress";
    pub const PROGRESS_LEVEL: &str = "level";
    pub const PROGRESS_AGGREGATE: &str = "aggregate";

    pub const CHALLENGES_BASE: &str = "challenges";
    pub const CHALLENGES_DIFFICULTY: &str = "difficulty";

    pub const STREAK_BASE: &str = "streak";
    pub const STREAK_EVALUATE: &str = "evaluate";
}
