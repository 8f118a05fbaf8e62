//! Derive the mascot's state from a user's classification history
//!
//! Nothing here is persisted: mood and level are recomputed from the
//! source transactions on every call.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::GamificationConfig;
use crate::db::Database;
use crate::error::Result;
use crate::leveling::{LevelCalculator, LevelInfo};
use crate::models::{Classification, ClassificationCounts};
use crate::mood::{Mood, MoodSelector};
use crate::presentation::CaplingView;
use crate::remote::SupabaseClient;

/// Where classification history comes from
#[async_trait]
pub trait ClassificationSource: Send + Sync {
    /// Classifications ordered most recent first, at most `limit` of them
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Classification>>;

    /// Tallies over the user's whole history
    async fn counts(&self, user_id: &str) -> Result<ClassificationCounts>;

    /// Short label for logs
    fn source_name(&self) -> &'static str;
}

#[async_trait]
impl ClassificationSource for Database {
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Classification>> {
        self.recent_classifications(user_id, limit)
    }

    async fn counts(&self, user_id: &str) -> Result<ClassificationCounts> {
        self.classification_counts(user_id)
    }

    fn source_name(&self) -> &'static str {
        "local"
    }
}

#[async_trait]
impl ClassificationSource for SupabaseClient {
    async fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<Classification>> {
        self.fetch_classifications(user_id, Some(limit)).await
    }

    async fn counts(&self, user_id: &str) -> Result<ClassificationCounts> {
        let all = self.fetch_classifications(user_id, None).await?;
        Ok(ClassificationCounts::from_classifications(&all))
    }

    fn source_name(&self) -> &'static str {
        "supabase"
    }
}

/// Derived mascot state for one user
#[derive(Debug, Clone, Serialize)]
pub struct CaplingStatus {
    pub name: String,
    pub mood: Mood,
    pub level: LevelInfo,
    pub counts: ClassificationCounts,
    pub view: CaplingView,
}

/// Runs the level calculator, mood selector and presentation together
#[derive(Debug, Clone, Default)]
pub struct CaplingService {
    config: GamificationConfig,
}

impl CaplingService {
    pub fn new(config: GamificationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GamificationConfig {
        &self.config
    }

    pub fn mood_selector(&self) -> MoodSelector {
        MoodSelector::new(self.config.mood)
    }

    /// Derive the full status from already-fetched history
    pub fn derive(
        &self,
        name: &str,
        recent: &[Classification],
        counts: ClassificationCounts,
    ) -> CaplingStatus {
        let mood = self.mood_selector().select(recent);
        let level = LevelCalculator::new(&self.config).from_counts(&counts);
        let view = CaplingView::build(mood, &level, name, &self.config.aura);

        CaplingStatus {
            name: name.to_string(),
            mood,
            level,
            counts,
            view,
        }
    }

    /// Fetch history from `source` and derive the full status
    pub async fn status<S>(&self, source: &S, user_id: &str, name: &str) -> Result<CaplingStatus>
    where
        S: ClassificationSource + ?Sized,
    {
        let recent = source.recent(user_id, self.config.mood.window).await?;
        let counts = source.counts(user_id).await?;
        let status = self.derive(name, &recent, counts);

        debug!(
            source = source.source_name(),
            user_id,
            mood = %status.mood,
            level = status.level.level,
            xp = status.level.xp,
            "Derived capling status"
        );
        Ok(status)
    }

    /// Current level from the whole history
    pub async fn level<S>(&self, source: &S, user_id: &str) -> Result<LevelInfo>
    where
        S: ClassificationSource + ?Sized,
    {
        let counts = source.counts(user_id).await?;
        Ok(LevelCalculator::new(&self.config).from_counts(&counts))
    }

    /// Current mood from the recent window
    pub async fn mood<S>(&self, source: &S, user_id: &str) -> Result<Mood>
    where
        S: ClassificationSource + ?Sized,
    {
        let recent = source.recent(user_id, self.config.mood.window).await?;
        Ok(self.mood_selector().select(&recent))
    }
}
