//! Async driver for a [`VoiceEngine`]
//!
//! One task owns the engine and is its only writer. It waits on either the
//! next input or the controller's restart deadline, whichever comes first.
//! Host controls travel on the same channel as adapter callbacks so their
//! relative order is preserved.

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::engine::VoiceEngine;
use super::types::AdapterEvent;

/// Input to a driven engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineInput {
    Adapter(AdapterEvent),
    StartListening,
    StopListening,
    SetMuted(bool),
    /// Stop the driver and hand the engine back
    Shutdown,
}

impl From<AdapterEvent> for EngineInput {
    fn from(event: AdapterEvent) -> Self {
        EngineInput::Adapter(event)
    }
}

/// Run `engine` until [`EngineInput::Shutdown`] arrives or every sender is
/// dropped, then hand it back
pub async fn drive(
    mut engine: VoiceEngine,
    mut inputs: mpsc::UnboundedReceiver<EngineInput>,
) -> VoiceEngine {
    loop {
        let deadline = engine.next_deadline().map(Instant::from_std);
        tokio::select! {
            input = inputs.recv() => match input {
                Some(EngineInput::Shutdown) | None => break,
                Some(input) => apply(&mut engine, input),
            },
            () = sleep_until(deadline) => engine.poll(Instant::now().into_std()),
        }
    }
    debug!("Voice driver stopping");
    engine
}

fn apply(engine: &mut VoiceEngine, input: EngineInput) {
    match input {
        EngineInput::Adapter(event) => engine.handle_at(event, Instant::now().into_std()),
        EngineInput::StartListening => {
            if let Err(err) = engine.start_listening() {
                warn!(error = %err, "Cannot start listening");
            }
        }
        EngineInput::StopListening => engine.stop_listening(),
        EngineInput::SetMuted(muted) => engine.set_muted(muted),
        EngineInput::Shutdown => {}
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
