// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tunable progress rules: difficulty boundaries, fire tiers and shield pricing

use crate::progress::difficulty::DifficultyThresholds;
use crate::progress::streak::StreakConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Progress rules loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default)]
    pub difficulty: DifficultyThresholds,
    #[serde(default)]
    pub streak: StreakConfig,
}

impl ProgressConfig {
    /// Load progress rules from file or use defaults
    ///
    /// Lookup order: explicit path, the user config directory
    /// (`growth-progress/progress.toml`), `./progress.toml`, embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path);
        }

        if let Some(user_path) = default_config_path().filter(|p| p.exists()) {
            return Self::load_from_file(&user_path);
        }

        if Path::new("progress.toml").exists() {
            return Self::load_from_file(Path::new("progress.toml"));
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read progress config file: {}", path.display()))?;

        let config: ProgressConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse progress config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject rule sets that would make tiers overlap
    pub fn validate(&self) -> Result<()> {
        if self.difficulty.easy_max >= self.difficulty.medium_max {
            return Err(anyhow::anyhow!(
                "difficulty.easy_max ({}) must be below difficulty.medium_max ({})",
                self.difficulty.easy_max,
                self.difficulty.medium_max
            ));
        }

        let tiers = &self.streak.fire_tiers;
        if tiers.spark_min == 0 || tiers.spark_min > tiers.flame_min || tiers.flame_min > tiers.blaze_min {
            return Err(anyhow::anyhow!(
                "fire tiers must satisfy 1 <= spark_min <= flame_min <= blaze_min"
            ));
        }

        Ok(())
    }
}

/// Default location of the progress rules file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("growth-progress").join("progress.toml"))
}
