//! Voice command analytics
//!
//! Records one event per dispatch attempt, tracks voice-mode sessions and
//! derives usage statistics and optimization recommendations from the log.
//! State is kept in bounded ring buffers and written through to a
//! [`KeyValueStore`] after every mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   track_command   ┌──────────────────┐
//! │   VoiceEngine   │ ────────────────▶ │  VoiceAnalytics  │──▶ broadcast
//! └─────────────────┘                   └────────┬─────────┘    snapshots
//!                                                ▼
//!                                  KeyValueStore (sqlite / memory)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut analytics = VoiceAnalytics::open(&config.analytics)?;
//! analytics.start_session("u1");
//! analytics.track_command(event);
//! let snapshot = analytics.get_analytics();
//! ```

mod db;
mod models;
mod queries;
mod recommendations;
mod store;
mod time_bucket;

pub use db::SqliteStore;
pub use models::{
    AnalyticsExport, AnalyticsSnapshot, CommandUsage, DailyUsage, ErrorPattern, EventContext,
    NewCommandEvent, PerformanceMetrics, Priority, Recommendation, RecommendationKind, Trends,
    TrendValue, UserEngagement, VoiceCommandEvent, VoiceSession,
};
pub use queries::{AnalyticsQuery, UNKNOWN_ERROR};
pub use recommendations::remedy_for;
pub use store::{KeyValueStore, MemoryStore};
pub use time_bucket::{day_bucket, trailing_day_buckets};

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::{AnalyticsSettings, StoreKind};

/// Storage key for the event log
pub const EVENTS_KEY: &str = "voice_analytics_events";
/// Storage key for closed session history
pub const SESSIONS_KEY: &str = "voice_analytics_sessions";
/// Storage key for the latest recommendation set
pub const RECOMMENDATIONS_KEY: &str = "voice_optimization_recommendations";

const SUBSCRIBER_BUFFER: usize = 16;

/// Analytics service. One instance per composition root.
pub struct VoiceAnalytics {
    store: Box<dyn KeyValueStore>,
    settings: AnalyticsSettings,
    events: VecDeque<VoiceCommandEvent>,
    sessions: VecDeque<VoiceSession>,
    current_session: Option<VoiceSession>,
    recommendations: Vec<Recommendation>,
    events_since_recommend: u32,
    degraded: bool,
    updates: broadcast::Sender<Arc<AnalyticsSnapshot>>,
}

impl VoiceAnalytics {
    /// Create the service over `store`, restoring any prior state.
    ///
    /// Missing or unreadable state starts empty; this never fails.
    pub fn new(store: impl KeyValueStore + 'static, settings: AnalyticsSettings) -> Self {
        let (updates, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        let mut analytics = Self {
            store: Box::new(store),
            settings,
            events: VecDeque::new(),
            sessions: VecDeque::new(),
            current_session: None,
            recommendations: Vec::new(),
            events_since_recommend: 0,
            degraded: false,
            updates,
        };
        analytics.restore();
        analytics
    }

    /// Service backed by a fresh [`MemoryStore`]
    pub fn in_memory(settings: AnalyticsSettings) -> Self {
        Self::new(MemoryStore::new(), settings)
    }

    /// Open the store selected in settings
    pub fn open(settings: &AnalyticsSettings) -> Result<Self> {
        Ok(match settings.store {
            StoreKind::Memory => Self::in_memory(settings.clone()),
            StoreKind::Sqlite => {
                let store = SqliteStore::open(&settings.resolved_db_path())?;
                Self::new(store, settings.clone())
            }
        })
    }

    fn restore(&mut self) {
        self.events = self.load_list(EVENTS_KEY);
        truncate_front(&mut self.events, self.settings.event_capacity);
        self.sessions = self.load_list(SESSIONS_KEY);
        truncate_front(&mut self.sessions, self.settings.session_capacity);
        self.recommendations = self.load_list::<Recommendation>(RECOMMENDATIONS_KEY).into();
        debug!(
            events = self.events.len(),
            sessions = self.sessions.len(),
            "Restored analytics state"
        );
    }

    fn load_list<T: DeserializeOwned>(&mut self, key: &str) -> VecDeque<T> {
        match self.store.get(key) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
                warn!(key, error = %err, "Discarding unreadable analytics state");
                VecDeque::new()
            }),
            Ok(None) => VecDeque::new(),
            Err(err) => {
                warn!(key, error = %err, "Analytics store unavailable, running in memory");
                self.degraded = true;
                VecDeque::new()
            }
        }
    }

    fn save_events(&mut self) {
        if !write_json(self.store.as_ref(), EVENTS_KEY, &self.events) {
            self.degraded = true;
        }
    }

    fn save_sessions(&mut self) {
        if !write_json(self.store.as_ref(), SESSIONS_KEY, &self.sessions) {
            self.degraded = true;
        }
    }

    fn save_recommendations(&mut self) {
        if !write_json(self.store.as_ref(), RECOMMENDATIONS_KEY, &self.recommendations) {
            self.degraded = true;
        }
    }

    /// Stamp and record a command attempt
    pub fn track_command(&mut self, event: NewCommandEvent) -> VoiceCommandEvent {
        self.track_command_at(event, Utc::now())
    }

    pub fn track_command_at(
        &mut self,
        event: NewCommandEvent,
        at: DateTime<Utc>,
    ) -> VoiceCommandEvent {
        let event = VoiceCommandEvent::stamp(event, at);
        self.record_event(event.clone());
        event
    }

    /// Append an already-stamped event
    pub fn record_event(&mut self, event: VoiceCommandEvent) {
        debug!(
            command = %event.command,
            success = event.success,
            confidence = event.confidence,
            "Tracked voice command"
        );

        if let Some(session) = self.current_session.as_mut() {
            session.record(&event, self.settings.event_capacity);
        }

        self.events.push_back(event);
        truncate_front(&mut self.events, self.settings.event_capacity);
        self.save_events();

        self.events_since_recommend += 1;
        if self.events_since_recommend >= self.settings.recommend_every.max(1) {
            self.refresh_recommendations();
        }

        self.notify();
    }

    /// Open a session for `user_id`, closing any session still open
    pub fn start_session(&mut self, user_id: &str) -> String {
        self.start_session_at(user_id, Utc::now())
    }

    pub fn start_session_at(&mut self, user_id: &str, at: DateTime<Utc>) -> String {
        if self.current_session.is_some() {
            self.end_session_at(at);
        }
        let session = VoiceSession::new(user_id, at);
        let id = session.id.clone();
        debug!(session_id = %id, user_id, "Voice session started");
        self.current_session = Some(session);
        id
    }

    /// Close the open session. No-op when none is open.
    pub fn end_session(&mut self) -> Option<VoiceSession> {
        self.end_session_at(Utc::now())
    }

    pub fn end_session_at(&mut self, at: DateTime<Utc>) -> Option<VoiceSession> {
        let mut session = self.current_session.take()?;
        session.close(at);
        debug!(
            session_id = %session.id,
            commands = session.total_commands,
            "Voice session ended"
        );

        self.sessions.push_back(session.clone());
        truncate_front(&mut self.sessions, self.settings.session_capacity);
        self.save_sessions();
        Some(session)
    }

    pub fn current_session(&self) -> Option<&VoiceSession> {
        self.current_session.as_ref()
    }

    /// Event log, oldest first
    pub fn events(&self) -> &VecDeque<VoiceCommandEvent> {
        &self.events
    }

    /// Closed sessions, oldest first
    pub fn sessions(&self) -> &VecDeque<VoiceSession> {
        &self.sessions
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    /// True once any save has failed
    pub fn is_persistence_degraded(&self) -> bool {
        self.degraded
    }

    pub fn get_analytics(&self) -> AnalyticsSnapshot {
        self.get_analytics_at(Utc::now())
    }

    pub fn get_analytics_at(&self, now: DateTime<Utc>) -> AnalyticsSnapshot {
        AnalyticsQuery::new(&self.events, &self.sessions)
            .with_windows(self.settings.window_days, self.settings.engagement_days)
            .snapshot(now)
    }

    /// Last computed recommendation set
    pub fn get_optimization_recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    /// Recompute recommendations from the current log and store them
    pub fn refresh_recommendations(&mut self) -> &[Recommendation] {
        let snapshot = self.get_analytics();
        self.recommendations =
            recommendations::generate(&snapshot, self.settings.low_success_threshold);
        self.events_since_recommend = 0;
        self.save_recommendations();
        &self.recommendations
    }

    /// Receive a fresh snapshot after every tracked event.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AnalyticsSnapshot>> {
        self.updates.subscribe()
    }

    fn notify(&self) {
        if self.updates.receiver_count() == 0 {
            return;
        }
        // A send error only means every receiver went away in between.
        let _ = self.updates.send(Arc::new(self.get_analytics()));
    }

    pub fn export_data(&self) -> AnalyticsExport {
        AnalyticsExport {
            events: self.events.iter().cloned().collect(),
            sessions: self.sessions.iter().cloned().collect(),
            export_date: Utc::now(),
        }
    }

    /// Replace the event log and session history with an export
    pub fn import_data(&mut self, export: AnalyticsExport) {
        self.events = export.events.into();
        truncate_front(&mut self.events, self.settings.event_capacity);
        self.sessions = export.sessions.into();
        truncate_front(&mut self.sessions, self.settings.session_capacity);
        debug!(
            events = self.events.len(),
            sessions = self.sessions.len(),
            "Imported analytics state"
        );

        self.save_events();
        self.save_sessions();
        self.refresh_recommendations();
        self.notify();
    }
}

/// Serialize `value` under `key`; false when the store rejected it
fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(anyhow::Error::from)
        .and_then(|json| store.set(key, &json));
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(key, error = %err, "Failed to persist analytics state, continuing in memory");
            false
        }
    }
}

/// Drop the oldest entries beyond `capacity`
fn truncate_front<T>(items: &mut VecDeque<T>, capacity: usize) {
    while items.len() > capacity {
        items.pop_front();
    }
}
