// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Growth Progress
//!
//! Progress engine for a personal-growth journaling app. It turns reflections,
//! challenges and point grants into levels, streaks, period charts and weekly
//! insight reports.
//!
//! ## Features
//!
//! - **Leveling**: quadratic level curve with titles and prestige tiers
//! - **Difficulty**: easy / medium / hard tiers from challenge points
//! - **Streaks**: daily streak state machine with shield protection
//! - **Aggregation**: daily, weekly and monthly point totals on the local calendar
//! - **Weekly insights**: deterministic stats with best-effort AI narrative
//!
//! ## Quick Start
//!
//! 1. Optionally set `INSIGHTS_API_URL` and `INSIGHTS_API_KEY` for enriched reports
//! 2. Start the HTTP server with `growth-progress-server`
//! 3. Call the JSON endpoints from the journaling app
//!
//! ## Example Usage
//!
//! ```rust
//! use growth_progress::progress::{classify, level_progress, Difficulty};
//!
//! let state = level_progress(300);
//! assert_eq!(state.level, 3);
//! assert_eq!(state.title, "Sapling");
//!
//! assert_eq!(classify(30), Difficulty::Medium);
//! ```

/// Plain data exchanged with the journaling app
pub mod models;

/// Configuration management and persistence
pub mod config;

/// Progression constants and route names
pub mod constants;

/// Leveling, difficulty, streak, aggregation and insight engines
pub mod progress;

/// HTTP request validation and handlers
pub mod routes;

/// HTTP server wiring
pub mod server;

/// Production logging and structured output
pub mod logging;

/// Health checks and monitoring
pub mod health;
