//! Analytics settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Where analytics state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Sqlite,
    Memory,
}

/// Analytics retention, windows and recommendation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// Events kept in the log (oldest evicted first)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Closed sessions kept in history
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,

    /// Trailing window for statistics and trends (days)
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Trailing window for user engagement (days)
    #[serde(default = "default_engagement_days")]
    pub engagement_days: u32,

    /// Commands below this success rate (percent) get a recommendation
    #[serde(default = "default_low_success_threshold")]
    pub low_success_threshold: f64,

    /// Recompute recommendations every N tracked events
    #[serde(default = "default_recommend_every")]
    pub recommend_every: u32,

    #[serde(default)]
    pub store: StoreKind,

    /// SQLite file, defaults to ~/.voxport/analytics.db
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

fn default_event_capacity() -> usize {
    1000
}

fn default_session_capacity() -> usize {
    100
}

fn default_window_days() -> u32 {
    30
}

fn default_engagement_days() -> u32 {
    7
}

fn default_low_success_threshold() -> f64 {
    70.0
}

fn default_recommend_every() -> u32 {
    1
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            session_capacity: default_session_capacity(),
            window_days: default_window_days(),
            engagement_days: default_engagement_days(),
            low_success_threshold: default_low_success_threshold(),
            recommend_every: default_recommend_every(),
            store: StoreKind::default(),
            db_path: None,
        }
    }
}

impl AnalyticsSettings {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| Config::global_config_dir().join("analytics.db"))
    }
}
