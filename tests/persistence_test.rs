//! Analytics state across restarts with the SQLite store

mod common;

use tempfile::TempDir;
use voxport::config::{AnalyticsSettings, StoreKind};
use voxport::stats::{KeyValueStore, SqliteStore, VoiceAnalytics, EVENTS_KEY};
use voxport::voice::{AdapterEvent, ControllerConfig};

fn sqlite_settings(dir: &TempDir) -> AnalyticsSettings {
    AnalyticsSettings {
        store: StoreKind::Sqlite,
        db_path: Some(dir.path().join("data").join("analytics.db")),
        ..Default::default()
    }
}

#[test]
fn test_engine_history_survives_restart() {
    let dir = TempDir::new().unwrap();
    let settings = sqlite_settings(&dir);

    {
        let analytics = VoiceAnalytics::open(&settings).unwrap();
        let (mut engine, _log, _actions) =
            common::create_engine_with(ControllerConfig::default(), analytics);
        engine.start_voice_mode("examiner-1").unwrap();
        engine.handle(AdapterEvent::final_result("show high performers", 0.9));
        engine.handle(AdapterEvent::SpeechEnded);
        engine.handle(AdapterEvent::final_result("mumble mumble", 0.4));
        engine.handle(AdapterEvent::SpeechEnded);
        engine.stop_voice_mode();
        assert!(!engine.analytics().is_persistence_degraded());
    }

    let analytics = VoiceAnalytics::open(&settings).unwrap();
    assert_eq!(analytics.events().len(), 2);
    assert_eq!(analytics.events()[0].command, "filter_high_performers");
    assert_eq!(analytics.sessions().len(), 1);
    assert_eq!(analytics.sessions()[0].total_commands, 2);
    assert!(analytics.current_session().is_none());

    let recommendations = analytics.get_optimization_recommendations();
    assert!(recommendations.iter().any(|r| r.target == "no_match"));
}

#[test]
fn test_corrupt_row_starts_empty() {
    let dir = TempDir::new().unwrap();
    let settings = sqlite_settings(&dir);

    {
        let store = SqliteStore::open(&settings.resolved_db_path()).unwrap();
        store.set(EVENTS_KEY, "{not json").unwrap();
    }

    let analytics = VoiceAnalytics::open(&settings).unwrap();
    assert!(analytics.events().is_empty());
    assert!(!analytics.is_persistence_degraded());
}

#[test]
fn test_import_replaces_stored_state() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();

    let export = {
        let analytics = VoiceAnalytics::open(&sqlite_settings(&source_dir)).unwrap();
        let (mut engine, _log, _actions) =
            common::create_engine_with(ControllerConfig::default(), analytics);
        engine.start_voice_mode("examiner-1").unwrap();
        engine.handle(AdapterEvent::final_result("export data", 0.95));
        engine.handle(AdapterEvent::SpeechEnded);
        engine.stop_voice_mode();
        engine.analytics().export_data()
    };

    let settings = sqlite_settings(&target_dir);
    {
        let mut analytics = VoiceAnalytics::open(&settings).unwrap();
        analytics.import_data(export);
    }

    let analytics = VoiceAnalytics::open(&settings).unwrap();
    assert_eq!(analytics.events().len(), 1);
    assert_eq!(analytics.events()[0].command, "export_data");
    assert_eq!(analytics.sessions().len(), 1);
}
