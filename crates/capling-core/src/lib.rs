//! Capling Core Library
//!
//! Shared functionality for the Capling spending companion:
//! - Database access and migrations (accounts, transactions, goals, profiles)
//! - Level/XP calculation from transaction classification history
//! - Mood selection from recent classifications
//! - Presentation view for the mascot (mood, aura, level badge, progress)
//! - Gamification config loaded from TOML
//! - Read-only client for a hosted Supabase store

pub mod capling;
pub mod config;
pub mod db;
pub mod error;
pub mod leveling;
pub mod models;
pub mod mood;
pub mod presentation;
pub mod profile;
pub mod remote;

/// Test utilities including a mock PostgREST server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use capling::{CaplingService, CaplingStatus, ClassificationSource};
pub use config::{AuraConfig, GamificationConfig, LevelCurve, MoodThresholds, XpAwards};
pub use db::{AuditEntry, Database, TransactionFilter};
pub use error::{Error, Result};
pub use leveling::{LevelCalculator, LevelInfo};
pub use mood::{Mood, MoodSelector};
pub use presentation::{AuraTier, CaplingView};
pub use remote::SupabaseClient;
