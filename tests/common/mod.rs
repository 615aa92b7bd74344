//! Shared test utilities for engine integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use voxport::config::AnalyticsSettings;
use voxport::stats::VoiceAnalytics;
use voxport::voice::{
    ActionSink, AppCommand, ControllerConfig, EngineConfig, SessionController, SpeechAdapter,
    SpeechOptions, VoiceEngine, catalog,
};

/// Everything the fake adapter was asked to do
#[derive(Debug, Default)]
pub struct AdapterLog {
    pub starts: usize,
    pub stops: usize,
    pub spoken: Vec<String>,
}

/// Adapter that records calls instead of touching audio
pub struct FakeAdapter {
    pub log: Arc<Mutex<AdapterLog>>,
}

impl SpeechAdapter for FakeAdapter {
    fn is_supported(&self) -> bool {
        true
    }

    fn start_listening(&mut self) -> Result<(), String> {
        self.log.lock().unwrap().starts += 1;
        Ok(())
    }

    fn stop_listening(&mut self) {
        self.log.lock().unwrap().stops += 1;
    }

    fn speak(&mut self, text: &str, _options: &SpeechOptions) {
        self.log.lock().unwrap().spoken.push(text.to_string());
    }
}

/// Engine over the default catalog with in-memory analytics
pub fn create_engine(
    config: ControllerConfig,
) -> (
    VoiceEngine,
    Arc<Mutex<AdapterLog>>,
    mpsc::UnboundedReceiver<AppCommand>,
) {
    create_engine_with(config, VoiceAnalytics::in_memory(AnalyticsSettings::default()))
}

pub fn create_engine_with(
    config: ControllerConfig,
    analytics: VoiceAnalytics,
) -> (
    VoiceEngine,
    Arc<Mutex<AdapterLog>>,
    mpsc::UnboundedReceiver<AppCommand>,
) {
    let log = Arc::new(Mutex::new(AdapterLog::default()));
    let adapter = FakeAdapter { log: log.clone() };
    let (sink, actions) = ActionSink::channel();
    let registry = catalog::default_registry(&sink, config.wake_gating)
        .expect("default catalog compiles");
    let controller = SessionController::new(Box::new(adapter), config);
    let engine = VoiceEngine::new(controller, registry, analytics, EngineConfig::default());
    (engine, log, actions)
}

/// Drain every action currently queued
pub fn take_actions(actions: &mut mpsc::UnboundedReceiver<AppCommand>) -> Vec<AppCommand> {
    let mut taken = Vec::new();
    while let Ok(action) = actions.try_recv() {
        taken.push(action);
    }
    taken
}
