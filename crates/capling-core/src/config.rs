//! Gamification configuration
//!
//! XP awards, the level curve, level titles, mood thresholds and aura tiers
//! are product tuning, not code. They are loaded from TOML with a two-layer
//! resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/capling/config/capling.toml)
//! 2. The embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Classification;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/capling.toml");

/// XP awarded per classified transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XpAwards {
    pub responsible: u32,
    pub neutral: u32,
    pub irresponsible: u32,
}

impl XpAwards {
    pub fn for_classification(&self, classification: Classification) -> u32 {
        match classification {
            Classification::Responsible => self.responsible,
            Classification::Neutral => self.neutral,
            Classification::Irresponsible => self.irresponsible,
        }
    }
}

impl Default for XpAwards {
    fn default() -> Self {
        Self {
            responsible: 10,
            neutral: 2,
            irresponsible: 0,
        }
    }
}

/// Cumulative XP thresholds, one per level. `thresholds[0]` is level 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelCurve {
    thresholds: Vec<u64>,
}

impl LevelCurve {
    /// Quadratic curve: level n starts at `base_xp * (n - 1) * n / 2`
    pub fn quadratic(base_xp: u64, max_level: u32) -> Result<Self> {
        if base_xp == 0 {
            return Err(Error::Config("levels.base_xp must be positive".into()));
        }
        if max_level == 0 {
            return Err(Error::Config("levels.max_level must be at least 1".into()));
        }
        let thresholds = (1..=u64::from(max_level))
            .map(|n| base_xp.checked_mul((n - 1) * n / 2))
            .collect::<Option<Vec<u64>>>()
            .ok_or_else(|| {
                Error::Config(format!(
                    "levels.base_xp too large for max_level = {}",
                    max_level
                ))
            })?;
        Ok(Self { thresholds })
    }

    /// Explicit thresholds. Must start at 0 and be strictly increasing.
    pub fn explicit(thresholds: Vec<u64>) -> Result<Self> {
        match thresholds.first() {
            None => return Err(Error::Config("levels.thresholds cannot be empty".into())),
            Some(&first) if first != 0 => {
                return Err(Error::Config(
                    "levels.thresholds must start at 0 (level 1)".into(),
                ))
            }
            _ => {}
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(
                "levels.thresholds must be strictly increasing".into(),
            ));
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[u64] {
        &self.thresholds
    }

    pub fn max_level(&self) -> u32 {
        self.thresholds.len() as u32
    }

    /// Cumulative XP at which `level` starts, if the level exists
    pub fn threshold(&self, level: u32) -> Option<u64> {
        let idx = (level as usize).checked_sub(1)?;
        self.thresholds.get(idx).copied()
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            thresholds: (1..=25u64).map(|n| 50 * (n - 1) * n / 2).collect(),
        }
    }
}

/// A title shown from `min_level` until the next tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTitle {
    pub min_level: u32,
    pub title: String,
}

/// Lower score bounds for each mood, highest first
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoodThresholds {
    /// Number of most recent transactions considered
    pub window: usize,
    pub happy: f64,
    pub neutral: f64,
    pub worried: f64,
    pub sad: f64,
}

impl MoodThresholds {
    fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::Config("mood.window must be at least 1".into()));
        }
        let bounds = [self.happy, self.neutral, self.worried, self.sad];
        if bounds.iter().any(|b| !b.is_finite() || *b < -1.0 || *b > 1.0) {
            return Err(Error::Config(
                "mood thresholds must lie within [-1, 1]".into(),
            ));
        }
        if bounds.windows(2).any(|w| w[0] < w[1]) {
            return Err(Error::Config(
                "mood thresholds must satisfy happy >= neutral >= worried >= sad".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MoodThresholds {
    fn default() -> Self {
        Self {
            window: 5,
            happy: 0.6,
            neutral: 0.0,
            worried: -0.4,
            sad: -0.8,
        }
    }
}

/// Minimum level for each aura tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AuraConfig {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub legendary: u32,
}

impl AuraConfig {
    fn validate(&self) -> Result<()> {
        let tiers = [self.low, self.medium, self.high, self.legendary];
        if tiers[0] <= 1 || tiers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(
                "aura tiers must satisfy 1 < low < medium < high < legendary".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AuraConfig {
    fn default() -> Self {
        Self {
            low: 5,
            medium: 10,
            high: 15,
            legendary: 20,
        }
    }
}

/// Complete gamification configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GamificationConfig {
    pub xp: XpAwards,
    pub levels: LevelCurve,
    pub titles: Vec<LevelTitle>,
    pub mood: MoodThresholds,
    pub aura: AuraConfig,
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            xp: XpAwards::default(),
            levels: LevelCurve::default(),
            titles: default_titles(),
            mood: MoodThresholds::default(),
            aura: AuraConfig::default(),
        }
    }
}

fn default_titles() -> Vec<LevelTitle> {
    [
        (1, "Budget Beginner"),
        (5, "Savvy Saver"),
        (10, "Money Manager"),
        (15, "Finance Expert"),
        (20, "Legendary Capling"),
    ]
    .into_iter()
    .map(|(min_level, title)| LevelTitle {
        min_level,
        title: title.to_string(),
    })
    .collect()
}

impl GamificationConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path, falling back to embedded defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Render the effective config as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to render config: {}", e)))
    }

    /// Title for a level: the last tier whose `min_level` is reached
    pub fn title_for_level(&self, level: u32) -> &str {
        self.titles
            .iter()
            .rev()
            .find(|t| t.min_level <= level)
            .map(|t| t.title.as_str())
            .unwrap_or("")
    }

    fn validate(&self) -> Result<()> {
        self.mood.validate()?;
        self.aura.validate()?;

        match self.titles.first() {
            None => return Err(Error::Config("at least one [[titles]] entry is required".into())),
            Some(first) if first.min_level != 1 => {
                return Err(Error::Config(
                    "the first title must start at min_level = 1".into(),
                ))
            }
            _ => {}
        }
        if self.titles.windows(2).any(|w| w[0].min_level >= w[1].min_level) {
            return Err(Error::Config(
                "titles must be ordered by strictly increasing min_level".into(),
            ));
        }
        if self.titles.iter().any(|t| t.title.trim().is_empty()) {
            return Err(Error::Config("titles cannot be empty".into()));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("capling").join("config").join("capling.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<GamificationConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    let content = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading gamification config");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    xp: Option<RawXp>,
    levels: Option<RawLevels>,
    titles: Option<Vec<LevelTitle>>,
    mood: Option<RawMood>,
    aura: Option<RawAura>,
}

#[derive(Debug, Deserialize)]
struct RawXp {
    responsible: Option<u32>,
    neutral: Option<u32>,
    irresponsible: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawLevels {
    base_xp: Option<u64>,
    max_level: Option<u32>,
    thresholds: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
struct RawMood {
    window: Option<usize>,
    happy: Option<f64>,
    neutral: Option<f64>,
    worried: Option<f64>,
    sad: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAura {
    low: Option<u32>,
    medium: Option<u32>,
    high: Option<u32>,
    legendary: Option<u32>,
}

fn parse_config(content: &str) -> Result<GamificationConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = GamificationConfig::default();

    if let Some(xp) = raw.xp {
        if let Some(v) = xp.responsible {
            config.xp.responsible = v;
        }
        if let Some(v) = xp.neutral {
            config.xp.neutral = v;
        }
        if let Some(v) = xp.irresponsible {
            config.xp.irresponsible = v;
        }
    }

    if let Some(levels) = raw.levels {
        config.levels = match levels.thresholds {
            Some(thresholds) => LevelCurve::explicit(thresholds)?,
            None => LevelCurve::quadratic(
                levels.base_xp.unwrap_or(50),
                levels.max_level.unwrap_or(25),
            )?,
        };
    }

    if let Some(titles) = raw.titles {
        config.titles = titles;
    }

    if let Some(mood) = raw.mood {
        if let Some(v) = mood.window {
            config.mood.window = v;
        }
        if let Some(v) = mood.happy {
            config.mood.happy = v;
        }
        if let Some(v) = mood.neutral {
            config.mood.neutral = v;
        }
        if let Some(v) = mood.worried {
            config.mood.worried = v;
        }
        if let Some(v) = mood.sad {
            config.mood.sad = v;
        }
    }

    if let Some(aura) = raw.aura {
        if let Some(v) = aura.low {
            config.aura.low = v;
        }
        if let Some(v) = aura.medium {
            config.aura.medium = v;
        }
        if let Some(v) = aura.high {
            config.aura.high = v;
        }
        if let Some(v) = aura.legendary {
            config.aura.legendary = v;
        }
    }

    config.validate()?;
    Ok(config)
}
