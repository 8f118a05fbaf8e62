//! Mood selection from recent spending classifications

use serde::{Deserialize, Serialize};

use crate::config::MoodThresholds;
use crate::models::{Classification, ClassificationCounts};

/// The mascot's mood, best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Neutral,
    Worried,
    Sad,
    Depressed,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Neutral => "neutral",
            Self::Worried => "worried",
            Self::Sad => "sad",
            Self::Depressed => "depressed",
        }
    }

    pub fn all() -> &'static [Mood] {
        &[
            Self::Happy,
            Self::Neutral,
            Self::Worried,
            Self::Sad,
            Self::Depressed,
        ]
    }
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "neutral" => Ok(Self::Neutral),
            "worried" => Ok(Self::Worried),
            "sad" => Ok(Self::Sad),
            "depressed" => Ok(Self::Depressed),
            _ => Err(format!("Unknown mood: {}", s)),
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Picks a mood from a window of recent classifications
#[derive(Debug, Clone, Copy)]
pub struct MoodSelector {
    thresholds: MoodThresholds,
}

impl MoodSelector {
    pub fn new(thresholds: MoodThresholds) -> Self {
        Self { thresholds }
    }

    /// Number of recent classifications the selector looks at
    pub fn window(&self) -> usize {
        self.thresholds.window
    }

    /// Mood for classifications ordered most recent first.
    /// Only the first `window` entries are considered.
    pub fn select(&self, recent: &[Classification]) -> Mood {
        let considered = &recent[..recent.len().min(self.thresholds.window)];
        self.from_counts(&ClassificationCounts::from_classifications(considered))
    }

    /// Mood for pre-aggregated counts over a window
    pub fn from_counts(&self, counts: &ClassificationCounts) -> Mood {
        match Self::score(counts) {
            Some(score) => self.from_score(score),
            None => Mood::Neutral,
        }
    }

    /// Balance of responsible vs. irresponsible spending in [-1, 1],
    /// or `None` for an empty window
    pub fn score(counts: &ClassificationCounts) -> Option<f64> {
        let total = counts.total();
        if total == 0 {
            return None;
        }
        let balance = f64::from(counts.responsible) - f64::from(counts.irresponsible);
        Some(balance / total as f64)
    }

    /// Mood for a score. Monotonic: a higher score never maps to a sadder mood.
    pub fn from_score(&self, score: f64) -> Mood {
        let t = &self.thresholds;
        if score >= t.happy {
            Mood::Happy
        } else if score >= t.neutral {
            Mood::Neutral
        } else if score >= t.worried {
            Mood::Worried
        } else if score >= t.sad {
            Mood::Sad
        } else {
            Mood::Depressed
        }
    }
}

impl Default for MoodSelector {
    fn default() -> Self {
        Self::new(MoodThresholds::default())
    }
}
