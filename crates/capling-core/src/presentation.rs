//! Mascot presentation
//!
//! `CaplingView::build` is a pure function of mood, level info and name.
//! It only selects display tiers (colours, glow, labels); the art itself is
//! drawn by the client.

use serde::Serialize;

use crate::config::AuraConfig;
use crate::leveling::LevelInfo;
use crate::mood::Mood;

/// Aura intensity band, selected from the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuraTier {
    Minimal,
    Low,
    Medium,
    High,
    Legendary,
}

impl AuraTier {
    pub fn for_level(level: u32, config: &AuraConfig) -> Self {
        if level >= config.legendary {
            Self::Legendary
        } else if level >= config.high {
            Self::High
        } else if level >= config.medium {
            Self::Medium
        } else if level >= config.low {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Legendary => "legendary",
        }
    }

    /// Glow colours, innermost first
    fn glow(&self) -> &'static [&'static str] {
        match self {
            Self::Minimal => &["rgba(107,114,128,0.3)"],
            Self::Low => &["rgba(234,179,8,0.5)", "rgba(249,115,22,0.3)"],
            Self::Medium => &["rgba(34,197,94,0.6)", "rgba(59,130,246,0.4)"],
            Self::High => &["rgba(59,130,246,0.7)", "rgba(147,51,234,0.5)"],
            Self::Legendary => &[
                "rgba(168,85,247,0.8)",
                "rgba(236,72,153,0.6)",
                "rgba(168,85,247,0.4)",
            ],
        }
    }

    /// Base glow radius in pixels
    fn radius(&self) -> u32 {
        match self {
            Self::Minimal => 10,
            Self::Low => 15,
            Self::Medium => 20,
            Self::High => 25,
            Self::Legendary => 30,
        }
    }

    /// Badge gradient (from, to)
    fn badge(&self) -> (&'static str, &'static str) {
        match self {
            Self::Minimal => ("#9ca3af", "#4b5563"),
            Self::Low => ("#facc15", "#f97316"),
            Self::Medium => ("#4ade80", "#3b82f6"),
            Self::High => ("#3b82f6", "#9333ea"),
            Self::Legendary => ("#a855f7", "#ec4899"),
        }
    }
}

/// Two-stop colour gradient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gradient {
    pub from: String,
    pub to: String,
}

impl Gradient {
    fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Mood presentation: colours, emoji and the line the mascot says
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodView {
    pub mood: Mood,
    pub gradient: Gradient,
    pub emoji: String,
    pub message: String,
    /// Blush is only drawn when happy
    pub cheeks: bool,
    pub tears: bool,
}

impl MoodView {
    pub fn for_mood(mood: Mood) -> Self {
        let (from, to, emoji, message) = match mood {
            Mood::Happy => ("#4ade80", "#10b981", "😊", "Great job! Keep it up!"),
            Mood::Neutral => ("#60a5fa", "#06b6d4", "😐", "You're doing okay!"),
            Mood::Worried => ("#facc15", "#f97316", "😟", "Let's be more careful!"),
            Mood::Sad => ("#f87171", "#ec4899", "😢", "We can do better!"),
            Mood::Depressed => ("#4b5563", "#1f2937", "💔", "We need to fix this!"),
        };
        Self {
            mood,
            gradient: Gradient::new(from, to),
            emoji: emoji.to_string(),
            message: message.to_string(),
            cheeks: mood == Mood::Happy,
            tears: mood == Mood::Depressed,
        }
    }
}

/// Level-driven aura around the mascot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuraView {
    pub tier: AuraTier,
    pub glow_colors: Vec<String>,
    pub glow_radius: u32,
    pub pulse: bool,
    pub shimmer: bool,
}

impl AuraView {
    pub fn for_tier(tier: AuraTier) -> Self {
        Self {
            tier,
            glow_colors: tier.glow().iter().map(|c| c.to_string()).collect(),
            glow_radius: tier.radius(),
            pulse: tier >= AuraTier::Low,
            shimmer: tier == AuraTier::Legendary,
        }
    }
}

/// Level badge next to the mascot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeView {
    pub label: String,
    pub title: String,
    pub gradient: Gradient,
}

/// XP progress bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub xp_label: String,
    pub next_label: String,
    /// Bar fill in [0, 100]
    pub percent: f64,
}

/// Everything the client needs to draw the mascot card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaplingView {
    pub name: String,
    pub mood: MoodView,
    pub aura: AuraView,
    pub badge: BadgeView,
    pub progress: ProgressView,
}

impl CaplingView {
    pub fn build(mood: Mood, level: &LevelInfo, name: &str, aura: &AuraConfig) -> Self {
        let tier = AuraTier::for_level(level.level, aura);
        let (badge_from, badge_to) = tier.badge();

        let next_label = if level.is_max_level {
            "Max level".to_string()
        } else {
            format!("{} XP to next level", level.xp_for_next_level)
        };

        Self {
            name: name.to_string(),
            mood: MoodView::for_mood(mood),
            aura: AuraView::for_tier(tier),
            badge: BadgeView {
                label: format!("Level {}", level.level),
                title: level.title.clone(),
                gradient: Gradient::new(badge_from, badge_to),
            },
            progress: ProgressView {
                xp_label: format!("{} XP", level.xp),
                next_label,
                percent: (level.progress_percentage * 100.0).clamp(0.0, 100.0),
            },
        }
    }
}
