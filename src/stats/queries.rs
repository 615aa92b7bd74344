//! Snapshot computation over the event and session logs
//!
//! Everything here is a pure function of its inputs and `now`; calling it
//! twice with the same logs yields the same snapshot.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use super::models::{
    AnalyticsSnapshot, CommandUsage, DailyUsage, ErrorPattern, PerformanceMetrics, Trends,
    TrendValue, UserEngagement, VoiceCommandEvent, VoiceSession,
};
use super::time_bucket::day_bucket;

const TOP_COMMANDS: usize = 10;
const HIGH_CONFIDENCE: f64 = 0.8;
/// Label for failed events that carry no error type
pub const UNKNOWN_ERROR: &str = "unknown_error";

/// Aggregates over one period of events
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PeriodStats {
    total: u64,
    successful: u64,
    failed: u64,
    confidence_sum: f64,
    high_confidence: u64,
    execution_time_sum: u64,
}

impl PeriodStats {
    fn collect<'a>(events: impl IntoIterator<Item = &'a VoiceCommandEvent>) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.total += 1;
            if event.success {
                stats.successful += 1;
            } else {
                stats.failed += 1;
            }
            stats.confidence_sum += event.confidence;
            if event.confidence > HIGH_CONFIDENCE {
                stats.high_confidence += 1;
            }
            stats.execution_time_sum += event.execution_time_ms;
        }
        stats
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            sum / self.total as f64
        }
    }

    fn success_rate(&self) -> f64 {
        self.mean(self.successful as f64) * 100.0
    }

    fn average_confidence(&self) -> f64 {
        self.mean(self.confidence_sum)
    }
}

/// Read-only view over the analytics logs
pub struct AnalyticsQuery<'a> {
    events: Vec<&'a VoiceCommandEvent>,
    sessions: Vec<&'a VoiceSession>,
    window_days: u32,
    engagement_days: u32,
}

impl<'a> AnalyticsQuery<'a> {
    pub fn new(
        events: impl IntoIterator<Item = &'a VoiceCommandEvent>,
        sessions: impl IntoIterator<Item = &'a VoiceSession>,
    ) -> Self {
        Self {
            events: events.into_iter().collect(),
            sessions: sessions.into_iter().collect(),
            window_days: 30,
            engagement_days: 7,
        }
    }

    pub fn with_windows(mut self, window_days: u32, engagement_days: u32) -> Self {
        self.window_days = window_days;
        self.engagement_days = engagement_days;
        self
    }

    /// Compute the full snapshot as of `now`
    pub fn snapshot(&self, now: DateTime<Utc>) -> AnalyticsSnapshot {
        let window = Duration::days(self.window_days as i64);
        let recent: Vec<&VoiceCommandEvent> = self.between(now - window, now).collect();
        let previous = PeriodStats::collect(self.between(now - window - window, now - window));
        let stats = PeriodStats::collect(recent.iter().copied());

        AnalyticsSnapshot {
            generated_at: now,
            total_commands: self.events.len() as u64,
            window_commands: stats.total,
            success_rate: stats.success_rate(),
            average_confidence: stats.average_confidence(),
            most_used_commands: most_used(&recent),
            error_patterns: error_patterns(&recent),
            user_engagement: self.engagement(now),
            performance: PerformanceMetrics {
                average_execution_time_ms: stats.mean(stats.execution_time_sum as f64),
                recognition_accuracy: stats.mean(stats.high_confidence as f64) * 100.0,
                user_satisfaction: (stats.success_rate() + stats.average_confidence() * 100.0)
                    / 2.0,
            },
            trends: Trends {
                usage: TrendValue::new(stats.total as f64, previous.total as f64),
                confidence: TrendValue::new(
                    stats.average_confidence(),
                    previous.average_confidence(),
                ),
                failures: TrendValue::new(stats.failed as f64, previous.failed as f64),
            },
            daily_usage: daily_usage(&recent),
        }
    }

    /// Events with `from < timestamp <= to`
    fn between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a VoiceCommandEvent> + '_ {
        self.events
            .iter()
            .copied()
            .filter(move |e| e.timestamp > from && e.timestamp <= to)
    }

    fn engagement(&self, now: DateTime<Utc>) -> UserEngagement {
        let cutoff = now - Duration::days(self.engagement_days as i64);
        let sessions: Vec<&VoiceSession> = self
            .sessions
            .iter()
            .copied()
            .filter(|s| s.start_time > cutoff && s.start_time <= now)
            .collect();

        if sessions.is_empty() {
            return UserEngagement::default();
        }

        let users: HashSet<&str> = sessions.iter().map(|s| s.user_id.as_str()).collect();
        let n = sessions.len() as f64;
        let total_ms: u64 = sessions.iter().map(|s| s.total_duration_ms).sum();
        let total_commands: u64 = sessions.iter().map(|s| s.total_commands).sum();

        UserEngagement {
            active_users: users.len() as u64,
            average_session_duration_secs: total_ms as f64 / 1000.0 / n,
            commands_per_session: total_commands as f64 / n,
        }
    }
}

fn most_used(events: &[&VoiceCommandEvent]) -> Vec<CommandUsage> {
    let mut per_command: HashMap<&str, (u64, u64)> = HashMap::new();
    for event in events {
        let entry = per_command.entry(event.command.as_str()).or_default();
        entry.0 += 1;
        if event.success {
            entry.1 += 1;
        }
    }

    let mut usage: Vec<CommandUsage> = per_command
        .into_iter()
        .map(|(command, (count, successful))| CommandUsage {
            command: command.to_string(),
            count,
            success_rate: successful as f64 / count as f64 * 100.0,
        })
        .collect();
    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.command.cmp(&b.command)));
    usage.truncate(TOP_COMMANDS);
    usage
}

fn error_patterns(events: &[&VoiceCommandEvent]) -> Vec<ErrorPattern> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    let mut failed = 0u64;
    for event in events.iter().filter(|e| !e.success) {
        failed += 1;
        *counts
            .entry(event.error_type.as_deref().unwrap_or(UNKNOWN_ERROR))
            .or_default() += 1;
    }

    let mut patterns: Vec<ErrorPattern> = counts
        .into_iter()
        .map(|(error, count)| ErrorPattern {
            error: error.to_string(),
            count,
            percentage: count as f64 / failed as f64 * 100.0,
        })
        .collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.error.cmp(&b.error)));
    patterns
}

fn daily_usage(events: &[&VoiceCommandEvent]) -> Vec<DailyUsage> {
    let mut days: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for event in events {
        let entry = days.entry(day_bucket(event.timestamp)).or_default();
        entry.0 += 1;
        if event.success {
            entry.1 += 1;
        }
    }
    days.into_iter()
        .map(|(day, (total, successful))| DailyUsage {
            day,
            total,
            successful,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::models::NewCommandEvent;

    fn event_at(
        at: DateTime<Utc>,
        command: &str,
        confidence: f64,
        error: Option<&str>,
    ) -> VoiceCommandEvent {
        VoiceCommandEvent::stamp(
            NewCommandEvent {
                user_id: "u1".to_string(),
                command: command.to_string(),
                confidence,
                success: error.is_none(),
                execution_time_ms: 20,
                error_type: error.map(str::to_string),
                ..Default::default()
            },
            at,
        )
    }

    #[test]
    fn test_empty_snapshot_is_zeroed() {
        let snapshot = AnalyticsQuery::new(&[], &[]).snapshot(Utc::now());

        assert_eq!(snapshot.total_commands, 0);
        assert_eq!(snapshot.success_rate, 0.0);
        assert_eq!(snapshot.average_confidence, 0.0);
        assert!(snapshot.most_used_commands.is_empty());
        assert!(snapshot.error_patterns.is_empty());
        assert!(snapshot.daily_usage.is_empty());
        assert_eq!(snapshot.user_engagement, UserEngagement::default());
        assert!(!snapshot.performance.user_satisfaction.is_nan());
        assert_eq!(snapshot.trends.usage_growth(), 0.0);
        assert_eq!(snapshot.trends.confidence_change(), 0.0);
    }

    #[test]
    fn test_rates_and_performance() {
        let now = Utc::now();
        let events = vec![
            event_at(now, "help", 0.9, None),
            event_at(now, "help", 0.7, None),
            event_at(now, "export_data", 0.5, Some("processing_error")),
            event_at(now, "clear_filters", 0.9, None),
        ];
        let snapshot = AnalyticsQuery::new(&events, &[]).snapshot(now);

        assert_eq!(snapshot.window_commands, 4);
        assert_eq!(snapshot.success_rate, 75.0);
        assert!((snapshot.average_confidence - 0.75).abs() < 1e-9);
        assert_eq!(snapshot.performance.recognition_accuracy, 50.0);
        assert_eq!(snapshot.performance.average_execution_time_ms, 20.0);
        assert!((snapshot.performance.user_satisfaction - 75.0).abs() < 1e-9);

        assert_eq!(snapshot.most_used_commands[0].command, "help");
        assert_eq!(snapshot.most_used_commands[0].count, 2);
        assert_eq!(snapshot.most_used_commands[0].success_rate, 100.0);
        let export = snapshot
            .most_used_commands
            .iter()
            .find(|c| c.command == "export_data")
            .unwrap();
        assert_eq!(export.success_rate, 0.0);
    }

    #[test]
    fn test_window_excludes_old_events() {
        let now = Utc::now();
        let events = vec![
            event_at(now - Duration::days(45), "help", 0.9, None),
            event_at(now - Duration::days(1), "help", 0.9, None),
        ];
        let snapshot = AnalyticsQuery::new(&events, &[]).snapshot(now);

        assert_eq!(snapshot.total_commands, 2);
        assert_eq!(snapshot.window_commands, 1);
        assert_eq!(snapshot.daily_usage.len(), 1);
    }

    #[test]
    fn test_error_patterns_include_unknown() {
        let now = Utc::now();
        let events = vec![
            event_at(now, "no_match", 0.4, Some("no_match")),
            event_at(now, "no_match", 0.4, Some("no_match")),
            event_at(now, "help", 0.9, None),
            {
                let mut e = event_at(now, "x", 0.2, None);
                e.success = false;
                e
            },
        ];
        let snapshot = AnalyticsQuery::new(&events, &[]).snapshot(now);

        assert_eq!(snapshot.error_patterns.len(), 2);
        assert_eq!(snapshot.error_patterns[0].error, "no_match");
        assert!((snapshot.error_patterns[0].percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(snapshot.error_patterns[1].error, UNKNOWN_ERROR);
    }

    #[test]
    fn test_top_commands_capped() {
        let now = Utc::now();
        let events: Vec<_> = (0..15)
            .map(|i| event_at(now, &format!("cmd_{i:02}"), 0.9, None))
            .collect();
        let snapshot = AnalyticsQuery::new(&events, &[]).snapshot(now);

        assert_eq!(snapshot.most_used_commands.len(), TOP_COMMANDS);
        assert_eq!(snapshot.most_used_commands[0].command, "cmd_00");
    }

    #[test]
    fn test_trends_against_previous_window() {
        let now = Utc::now();
        let events = vec![
            event_at(now - Duration::days(40), "help", 0.5, Some("timeout")),
            event_at(now - Duration::days(35), "help", 0.5, Some("timeout")),
            event_at(now - Duration::days(2), "help", 0.9, None),
            event_at(now - Duration::days(1), "help", 0.9, None),
            event_at(now, "help", 0.9, Some("timeout")),
        ];
        let trends = AnalyticsQuery::new(&events, &[]).snapshot(now).trends;

        assert_eq!(trends.usage, TrendValue::new(3.0, 2.0));
        assert_eq!(trends.usage_growth(), 50.0);
        assert!((trends.confidence_change() - 80.0).abs() < 1e-9);
        assert_eq!(trends.failure_change(), -50.0);
    }

    #[test]
    fn test_engagement_from_recent_sessions() {
        let now = Utc::now();
        let mut a = VoiceSession::new("u1", now - Duration::hours(2));
        a.total_commands = 4;
        a.close(now - Duration::hours(2) + Duration::seconds(60));
        let mut b = VoiceSession::new("u2", now - Duration::hours(1));
        b.total_commands = 2;
        b.close(now - Duration::hours(1) + Duration::seconds(120));
        let mut stale = VoiceSession::new("u3", now - Duration::days(10));
        stale.close(now - Duration::days(10) + Duration::seconds(10));

        let sessions = vec![a, b, stale];
        let engagement = AnalyticsQuery::new(&[], &sessions).snapshot(now).user_engagement;

        assert_eq!(engagement.active_users, 2);
        assert_eq!(engagement.average_session_duration_secs, 90.0);
        assert_eq!(engagement.commands_per_session, 3.0);
    }
}
