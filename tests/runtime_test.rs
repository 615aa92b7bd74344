//! Driven engine: restart timer and host controls over the input channel

mod common;

use std::time::Duration;

use tokio::sync::mpsc;
use voxport::voice::{AdapterEvent, ControllerConfig, EngineInput, ListeningState, drive};

#[tokio::test(start_paused = true)]
async fn test_auto_restart_after_debounce() {
    let (mut engine, log, _actions) = common::create_engine(ControllerConfig::default());
    engine.start_voice_mode("examiner-1").unwrap();
    let mut state = engine.subscribe_state();
    assert_eq!(log.lock().unwrap().starts, 1);

    let (tx, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(engine, rx));

    tx.send(AdapterEvent::End.into()).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(*state.borrow_and_update(), ListeningState::Idle);
    assert_eq!(log.lock().unwrap().starts, 1);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(log.lock().unwrap().starts, 2);
    assert_eq!(*state.borrow(), ListeningState::Listening);

    tx.send(EngineInput::Shutdown).unwrap();
    let engine = driver.await.unwrap();
    assert_eq!(engine.state(), ListeningState::Listening);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_restart() {
    let (mut engine, log, _actions) = common::create_engine(ControllerConfig::default());
    engine.start_voice_mode("examiner-1").unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(engine, rx));

    tx.send(AdapterEvent::End.into()).unwrap();
    tx.send(EngineInput::StopListening).unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(log.lock().unwrap().starts, 1);

    tx.send(EngineInput::StartListening).unwrap();
    drop(tx);
    let engine = driver.await.unwrap();
    assert_eq!(engine.state(), ListeningState::Listening);
    assert_eq!(log.lock().unwrap().starts, 2);
}

#[tokio::test(start_paused = true)]
async fn test_inputs_apply_in_order() {
    let (mut engine, log, mut actions) = common::create_engine(ControllerConfig::default());
    engine.start_voice_mode("examiner-1").unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(engine, rx));

    tx.send(EngineInput::SetMuted(true)).unwrap();
    tx.send(AdapterEvent::final_result("export data", 0.9).into())
        .unwrap();
    tx.send(EngineInput::SetMuted(false)).unwrap();
    tx.send(AdapterEvent::final_result("export data", 0.9).into())
        .unwrap();
    tx.send(AdapterEvent::SpeechEnded.into()).unwrap();
    tx.send(EngineInput::Shutdown).unwrap();

    let mut engine = driver.await.unwrap();
    assert_eq!(log.lock().unwrap().spoken.len(), 1);
    assert_eq!(common::take_actions(&mut actions).len(), 2);
    assert_eq!(engine.drain_outcomes().len(), 2);
    assert_eq!(engine.analytics().events().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_finals_all_dispatch() {
    let (mut engine, log, mut actions) = common::create_engine(ControllerConfig::default());
    engine.start_voice_mode("examiner-1").unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let driver = tokio::spawn(drive(engine, rx));

    // Speech-end notices queue up behind the transcripts, as with a host
    // that reports them asynchronously.
    for text in ["show high performers", "clear filters", "export data"] {
        tx.send(AdapterEvent::final_result(text, 0.9).into()).unwrap();
    }
    for _ in 0..3 {
        tx.send(AdapterEvent::SpeechEnded.into()).unwrap();
    }
    tx.send(EngineInput::Shutdown).unwrap();

    let engine = driver.await.unwrap();
    let commands: Vec<_> = engine
        .analytics()
        .events()
        .iter()
        .map(|e| e.command.clone())
        .collect();
    assert_eq!(
        commands,
        vec!["filter_high_performers", "clear_filters", "export_data"]
    );
    assert_eq!(common::take_actions(&mut actions).len(), 3);
    assert_eq!(log.lock().unwrap().spoken.len(), 3);
    assert_eq!(engine.state(), ListeningState::Listening);
}
