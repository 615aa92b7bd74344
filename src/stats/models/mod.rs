//! Data models for voice command analytics
//!
//! Events and sessions are what gets persisted; everything in [`snapshot`]
//! is derived from them on demand.

mod snapshot;

pub use snapshot::{
    AnalyticsSnapshot, CommandUsage, DailyUsage, ErrorPattern, PerformanceMetrics, Trends,
    TrendValue, UserEngagement,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a command was issued from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub current_filters: Vec<serde_json::Value>,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub browser_type: String,
}

/// A command attempt before it is stamped with an id and timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCommandEvent {
    pub user_id: String,
    pub user_role: String,
    pub command: String,
    pub recognized_text: String,
    pub confidence: f64,
    pub success: bool,
    pub execution_time_ms: u64,
    pub error_type: Option<String>,
    pub context: EventContext,
}

/// One resolved or failed dispatch attempt. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCommandEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_role: String,
    pub command: String,
    pub recognized_text: String,
    pub confidence: f64,
    pub success: bool,
    pub execution_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub context: EventContext,
}

impl VoiceCommandEvent {
    /// Stamp a new event with a fresh id
    pub fn stamp(event: NewCommandEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: format!("cmd_{}", uuid::Uuid::new_v4().simple()),
            timestamp,
            user_id: event.user_id,
            user_role: event.user_role,
            command: event.command,
            recognized_text: event.recognized_text,
            confidence: clamp_confidence(event.confidence),
            success: event.success,
            execution_time_ms: event.execution_time_ms,
            error_type: event.error_type,
            context: event.context,
        }
    }
}

/// Confidence in `[0, 1]`; anything non-finite counts as no confidence
fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// A span of voice-mode activity with running aggregates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSession {
    pub id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub total_commands: u64,
    pub successful_commands: u64,
    pub average_confidence: f64,
    pub total_duration_ms: u64,
    #[serde(default)]
    pub commands: Vec<VoiceCommandEvent>,
}

impl VoiceSession {
    pub fn new(user_id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: format!("session_{}", uuid::Uuid::new_v4().simple()),
            user_id: user_id.into(),
            start_time,
            end_time: None,
            total_commands: 0,
            successful_commands: 0,
            average_confidence: 0.0,
            total_duration_ms: 0,
            commands: Vec::new(),
        }
    }

    /// Fold an event into the running aggregates. Only the newest `capacity`
    /// events are kept in `commands`; the counters cover all of them.
    pub fn record(&mut self, event: &VoiceCommandEvent, capacity: usize) {
        self.total_commands += 1;
        if event.success {
            self.successful_commands += 1;
        }
        let n = self.total_commands as f64;
        self.average_confidence += (event.confidence - self.average_confidence) / n;
        self.commands.push(event.clone());
        if self.commands.len() > capacity {
            let excess = self.commands.len() - capacity;
            self.commands.drain(..excess);
        }
    }

    /// Close the session
    pub fn close(&mut self, end_time: DateTime<Utc>) {
        self.total_duration_ms = (end_time - self.start_time).num_milliseconds().max(0) as u64;
        self.end_time = Some(end_time);
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Kind of optimization recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    CommandOptimization,
    ErrorReduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// A suggested improvement derived from the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    /// Command id or error type the recommendation is about
    pub target: String,
    pub issue: String,
    pub suggestion: String,
    pub priority: Priority,
}

/// Full dump of the analytics state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsExport {
    pub events: Vec<VoiceCommandEvent>,
    pub sessions: Vec<VoiceSession>,
    pub export_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(confidence: f64, success: bool) -> VoiceCommandEvent {
        VoiceCommandEvent::stamp(
            NewCommandEvent {
                command: "clear_filters".to_string(),
                confidence,
                success,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_session_running_mean() {
        let mut session = VoiceSession::new("u1", Utc::now());
        session.record(&event(0.9, true), 10);
        session.record(&event(0.6, false), 10);
        session.record(&event(0.75, true), 10);

        assert_eq!(session.total_commands, 3);
        assert_eq!(session.successful_commands, 2);
        assert!((session.average_confidence - 0.75).abs() < 1e-9);
        assert_eq!(session.commands.len(), 3);
    }

    #[test]
    fn test_session_keeps_newest_commands() {
        let mut session = VoiceSession::new("u1", Utc::now());
        for confidence in [0.1, 0.2, 0.3, 0.4] {
            session.record(&event(confidence, true), 2);
        }

        assert_eq!(session.total_commands, 4);
        let kept: Vec<f64> = session.commands.iter().map(|e| e.confidence).collect();
        assert_eq!(kept, vec![0.3, 0.4]);
        assert!((session.average_confidence - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_confidence_is_zero() {
        assert_eq!(event(f64::NAN, true).confidence, 0.0);
        assert_eq!(event(f64::INFINITY, true).confidence, 0.0);
        assert_eq!(event(f64::NEG_INFINITY, true).confidence, 0.0);
        assert_eq!(event(1.7, true).confidence, 1.0);
        assert_eq!(event(-0.2, true).confidence, 0.0);
    }

    #[test]
    fn test_session_close_duration() {
        let start = Utc::now();
        let mut session = VoiceSession::new("u1", start);
        session.close(start + chrono::Duration::seconds(90));

        assert!(!session.is_open());
        assert_eq!(session.total_duration_ms, 90_000);
    }

    #[test]
    fn test_stamp_clamps_confidence() {
        assert_eq!(event(1.7, true).confidence, 1.0);
        assert_eq!(event(-0.2, true).confidence, 0.0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(event(0.8, true)).unwrap();
        assert!(json.get("recognizedText").is_some());
        assert!(json.get("executionTimeMs").is_some());
        assert!(json.get("errorType").is_none());
    }
}
