//! Derived analytics views
//!
//! Computed from the event log on demand, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage of one command in the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandUsage {
    pub command: String,
    pub count: u64,
    /// Percent
    pub success_rate: f64,
}

/// Frequency of one error type among failed events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPattern {
    pub error: String,
    pub count: u64,
    /// Percent of failed events
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEngagement {
    /// Distinct users with a session in the engagement window
    pub active_users: u64,
    pub average_session_duration_secs: f64,
    pub commands_per_session: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub average_execution_time_ms: f64,
    /// Percent of events with confidence above 0.8
    pub recognition_accuracy: f64,
    /// (success rate + average confidence * 100) / 2
    pub user_satisfaction: f64,
}

/// Trend comparison with previous period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendValue {
    pub current: f64,
    pub previous: f64,
}

impl TrendValue {
    pub fn new(current: f64, previous: f64) -> Self {
        Self { current, previous }
    }

    /// Percentage change; 0 when the previous period is 0
    pub fn percent_change(&self) -> f64 {
        if self.previous == 0.0 {
            0.0
        } else {
            ((self.current - self.previous) / self.previous) * 100.0
        }
    }
}

/// Recent window against the window before it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    /// Event counts
    pub usage: TrendValue,
    /// Average confidence
    pub confidence: TrendValue,
    /// Failed event counts
    pub failures: TrendValue,
}

impl Trends {
    pub fn usage_growth(&self) -> f64 {
        self.usage.percent_change()
    }

    pub fn confidence_change(&self) -> f64 {
        self.confidence.percent_change()
    }

    pub fn failure_change(&self) -> f64 {
        self.failures.percent_change()
    }
}

/// Per-day totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// YYYY-MM-DD
    pub day: String,
    pub total: u64,
    pub successful: u64,
}

/// Complete analytics view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub generated_at: DateTime<Utc>,
    /// Events in the whole log
    pub total_commands: u64,
    /// Events in the window
    pub window_commands: u64,
    /// Percent
    pub success_rate: f64,
    pub average_confidence: f64,
    pub most_used_commands: Vec<CommandUsage>,
    pub error_patterns: Vec<ErrorPattern>,
    pub user_engagement: UserEngagement,
    pub performance: PerformanceMetrics,
    pub trends: Trends,
    pub daily_usage: Vec<DailyUsage>,
}
