// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the growth progress server
//!
//! Two layers: process settings read from the environment, and progress
//! rules read from a TOML file.

pub mod environment;
pub mod progress_config;

pub use environment::{EnrichmentConfig, ServerConfig};
pub use progress_config::ProgressConfig;
