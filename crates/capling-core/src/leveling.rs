//! Level/XP calculation
//!
//! Level info is a pure derived view over a user's classification history.
//! It is recomputed on every read and never stored, so it cannot drift from
//! the transactions it comes from.

use serde::{Deserialize, Serialize};

use crate::config::GamificationConfig;
use crate::models::{Classification, ClassificationCounts};

/// Derived level state for a total XP value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    /// 1-based level
    pub level: u32,
    /// Total XP accumulated
    pub xp: u64,
    /// XP still needed to reach the next level (0 at max level)
    pub xp_for_next_level: u64,
    /// Progress through the current level, in [0, 1]
    pub progress_percentage: f64,
    pub title: String,
    pub is_max_level: bool,
}

/// Maps classification history to XP and XP to levels
#[derive(Debug, Clone, Copy)]
pub struct LevelCalculator<'a> {
    config: &'a GamificationConfig,
}

impl<'a> LevelCalculator<'a> {
    pub fn new(config: &'a GamificationConfig) -> Self {
        Self { config }
    }

    /// Total XP earned by a classification history
    pub fn total_xp(&self, classifications: &[Classification]) -> u64 {
        classifications
            .iter()
            .map(|c| u64::from(self.config.xp.for_classification(*c)))
            .sum()
    }

    /// Total XP earned by pre-aggregated classification counts
    pub fn xp_from_counts(&self, counts: &ClassificationCounts) -> u64 {
        let xp = &self.config.xp;
        [
            (counts.responsible, xp.responsible),
            (counts.neutral, xp.neutral),
            (counts.irresponsible, xp.irresponsible),
        ]
        .into_iter()
        .map(|(count, award)| u64::from(count) * u64::from(award))
        .fold(0, u64::saturating_add)
    }

    /// Highest level whose cumulative threshold is at or below `xp`
    pub fn level_for_xp(&self, xp: u64) -> u32 {
        let thresholds = self.config.levels.thresholds();
        // thresholds[0] is 0, so at least one entry always matches
        thresholds.partition_point(|&t| t <= xp).max(1) as u32
    }

    /// Full level info for a total XP value
    pub fn level_info(&self, xp: u64) -> LevelInfo {
        let curve = &self.config.levels;
        let level = self.level_for_xp(xp);
        let title = self.config.title_for_level(level).to_string();

        let current = curve.threshold(level).unwrap_or(0);
        match curve.threshold(level + 1) {
            Some(next) => {
                let span = (next - current) as f64;
                let progress = ((xp - current) as f64 / span).clamp(0.0, 1.0);
                LevelInfo {
                    level,
                    xp,
                    xp_for_next_level: next - xp,
                    progress_percentage: progress,
                    title,
                    is_max_level: false,
                }
            }
            None => LevelInfo {
                level,
                xp,
                xp_for_next_level: 0,
                progress_percentage: 1.0,
                title,
                is_max_level: true,
            },
        }
    }

    /// Level info straight from a classification history
    pub fn from_classifications(&self, classifications: &[Classification]) -> LevelInfo {
        self.level_info(self.total_xp(classifications))
    }

    /// Level info from pre-aggregated counts
    pub fn from_counts(&self, counts: &ClassificationCounts) -> LevelInfo {
        self.level_info(self.xp_from_counts(counts))
    }
}
