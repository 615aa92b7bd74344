//! Listening session controller.
//!
//! Finite state machine around a [`SpeechAdapter`]. Adapter callbacks come in
//! through [`SessionController::handle`], explicit calls through the public
//! methods. Every transition and every transcript that should be dispatched is
//! queued as a [`ControllerOutput`]; the owner drains the queue after each call.
//!
//! The wake gate is orthogonal to the listening state: with gating enabled
//! and the gate closed, a running adapter sits in `Sleeping` and only
//! transcripts matching a wake command get through.
//!
//! A final result heard while a reply is being spoken ends `Speaking` early
//! and is routed like any other, unless it is the reply itself.

use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::actions::CommandRegistry;
use super::adapter::SpeechAdapter;
use super::error::{VoiceError, error_kind};
use super::types::{AdapterEvent, ControllerOutput, ControllerStatus, ListeningState, SpeechOptions};

/// Controller behaviour switches
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Restart the adapter after each recognition session ends
    pub continuous: bool,
    /// Require the wake command before transcripts are dispatched
    pub wake_gating: bool,
    /// Delay between a session ending and the automatic restart
    pub restart_debounce: Duration,
    /// Also restart after a recognition error
    pub restart_on_error: bool,
    /// Options passed with every utterance
    pub speech: SpeechOptions,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            continuous: true,
            wake_gating: false,
            restart_debounce: Duration::from_millis(1000),
            restart_on_error: true,
            speech: SpeechOptions::default(),
        }
    }
}

/// Listening session state machine
pub struct SessionController {
    adapter: Box<dyn SpeechAdapter + Send>,
    config: ControllerConfig,
    status: ControllerStatus,
    state: ListeningState,
    state_tx: watch::Sender<ListeningState>,
    outputs: Vec<ControllerOutput>,
    activated: bool,
    muted: bool,
    adapter_running: bool,
    stopped_by_user: bool,
    spoke_while_processing: bool,
    restart_at: Option<Instant>,
    last_utterance: Option<String>,
}

impl SessionController {
    /// Create a controller. Adapter support is checked here, once.
    pub fn new(adapter: Box<dyn SpeechAdapter + Send>, config: ControllerConfig) -> Self {
        let status = if adapter.is_supported() {
            ControllerStatus::Ready
        } else {
            tracing::warn!("Speech recognition unsupported, voice commands disabled");
            ControllerStatus::Unsupported
        };
        let (state_tx, _) = watch::channel(ListeningState::Idle);

        Self {
            adapter,
            config,
            status,
            state: ListeningState::Idle,
            state_tx,
            outputs: Vec::new(),
            activated: false,
            muted: false,
            adapter_running: false,
            stopped_by_user: false,
            spoke_while_processing: false,
            restart_at: None,
            last_utterance: None,
        }
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    pub fn is_supported(&self) -> bool {
        self.status == ControllerStatus::Ready
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    /// Watch the listening state
    pub fn subscribe_state(&self) -> watch::Receiver<ListeningState> {
        self.state_tx.subscribe()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Whether transcripts currently reach the dispatcher
    pub fn gate_open(&self) -> bool {
        !self.config.wake_gating || self.activated
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Pending auto-restart time. Hidden while speaking, since the restart
    /// waits for the utterance to end anyway.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            ListeningState::Speaking => None,
            _ => self.restart_at,
        }
    }

    /// Take queued outputs
    pub fn drain_outputs(&mut self) -> Vec<ControllerOutput> {
        std::mem::take(&mut self.outputs)
    }

    /// Start listening. Fails only when recognition is unsupported.
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        if !self.is_supported() {
            return Err(VoiceError::UnsupportedCapability);
        }
        self.stopped_by_user = false;
        self.restart_at = None;
        self.start_adapter();
        Ok(())
    }

    /// Stop listening from any state. Cancels a pending restart.
    pub fn stop_listening(&mut self) {
        self.stopped_by_user = true;
        self.restart_at = None;
        self.spoke_while_processing = false;
        if self.adapter_running {
            self.adapter.stop_listening();
            self.adapter_running = false;
        }
        self.set_state(ListeningState::Idle);
    }

    /// Open or close the wake gate
    pub fn set_activated(&mut self, activated: bool) {
        if self.activated == activated {
            return;
        }
        tracing::info!(activated, "Wake gate changed");
        self.activated = activated;
        if self.state.is_listening() {
            let next = self.listening_state();
            self.set_state(next);
        }
    }

    /// Speak an utterance unless muted. Returns whether it reached the adapter.
    pub fn speak(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        if self.muted {
            tracing::debug!(text, "Muted, utterance suppressed");
            return false;
        }
        self.adapter.speak(text, &self.config.speech);
        self.last_utterance = Some(text.to_string());
        if self.state == ListeningState::Processing {
            self.spoke_while_processing = true;
        }
        true
    }

    /// Feed an adapter callback into the state machine
    pub fn handle(&mut self, event: AdapterEvent, now: Instant, registry: &CommandRegistry) {
        match event {
            AdapterEvent::Result {
                text,
                is_final: false,
                ..
            } => {
                if self.state.is_listening() {
                    self.outputs.push(ControllerOutput::Interim { text });
                }
            }
            AdapterEvent::Result {
                text,
                is_final: true,
                confidence,
            } => self.on_final_result(text, confidence, registry),
            AdapterEvent::Error { kind } => {
                tracing::warn!(kind = %kind, state = %self.state, "Recognition error");
                self.adapter_running = false;
                self.spoke_while_processing = false;
                self.set_state(ListeningState::Idle);
                self.outputs.push(ControllerOutput::RecognitionError { kind });
                if self.config.restart_on_error {
                    self.schedule_restart(now);
                }
            }
            AdapterEvent::End => {
                tracing::debug!(state = %self.state, "Recognition session ended");
                self.adapter_running = false;
                // Speech keeps playing; SpeechEnded will settle on Idle.
                if self.state != ListeningState::Speaking {
                    self.set_state(ListeningState::Idle);
                }
                self.schedule_restart(now);
            }
            AdapterEvent::SpeechEnded => {
                if self.state == ListeningState::Speaking {
                    self.last_utterance = None;
                    let next = self.after_dispatch_state();
                    self.set_state(next);
                }
            }
        }
    }

    /// Leave `Processing` once the dispatcher is done with a transcript
    pub fn dispatch_complete(&mut self) {
        if self.state != ListeningState::Processing {
            return;
        }
        let next = if std::mem::take(&mut self.spoke_while_processing) {
            ListeningState::Speaking
        } else {
            self.after_dispatch_state()
        };
        self.set_state(next);
    }

    /// Fire the auto-restart if it is due
    pub fn poll(&mut self, now: Instant) {
        let Some(at) = self.restart_at else {
            return;
        };
        if at > now {
            return;
        }
        match self.state {
            // Deferred until the utterance finishes
            ListeningState::Speaking => {}
            ListeningState::Idle => {
                self.restart_at = None;
                tracing::info!("Auto-restarting recognition");
                self.start_adapter();
            }
            _ => self.restart_at = None,
        }
    }

    fn on_final_result(&mut self, text: String, confidence: f64, registry: &CommandRegistry) {
        if text.trim().is_empty() {
            return;
        }
        if self.state == ListeningState::Speaking {
            if self.is_echo(&text) {
                tracing::debug!(text = %text, "Final result echoes the reply, discarded");
                self.outputs.push(ControllerOutput::Discarded { text });
                return;
            }
            // The user talked over the reply: stop waiting for it and route the result.
            tracing::debug!(text = %text, "Final result while speaking");
            self.last_utterance = None;
            let next = self.after_dispatch_state();
            self.set_state(next);
        }
        match self.state {
            ListeningState::Listening => {
                self.set_state(ListeningState::Processing);
                self.outputs
                    .push(ControllerOutput::Transcript { text, confidence });
            }
            ListeningState::Sleeping if registry.is_wake(&text) => {
                self.set_state(ListeningState::Processing);
                self.outputs
                    .push(ControllerOutput::Transcript { text, confidence });
            }
            ListeningState::Sleeping => {
                tracing::debug!(text = %text, "Gate closed, transcript discarded");
                self.outputs.push(ControllerOutput::Discarded { text });
            }
            state => {
                tracing::debug!(%state, text = %text, "Final result outside a listening state, discarded");
                self.outputs.push(ControllerOutput::Discarded { text });
            }
        }
    }

    /// Whether `text` is the recognizer hearing the utterance being spoken.
    /// Short phrases that merely occur inside the reply do not count.
    fn is_echo(&self, text: &str) -> bool {
        let Some(utterance) = &self.last_utterance else {
            return false;
        };
        let heard = words(text);
        let spoken = words(utterance);
        if heard.is_empty() || heard.len() * 2 < spoken.len() {
            return false;
        }
        spoken.windows(heard.len()).any(|window| window == heard.as_slice())
    }

    fn start_adapter(&mut self) {
        if !self.adapter_running {
            if let Err(kind) = self.adapter.start_listening() {
                let kind = if kind.is_empty() {
                    error_kind::START_FAILED.to_string()
                } else {
                    kind
                };
                tracing::warn!(kind = %kind, "Failed to start recognition");
                self.set_state(ListeningState::Idle);
                self.outputs.push(ControllerOutput::RecognitionError { kind });
                return;
            }
            self.adapter_running = true;
        }
        if self.state == ListeningState::Idle {
            let next = self.listening_state();
            self.set_state(next);
        }
    }

    fn schedule_restart(&mut self, now: Instant) {
        if !self.config.continuous || self.stopped_by_user || !self.gate_open() {
            return;
        }
        let at = now + self.config.restart_debounce;
        tracing::debug!(delay_ms = self.config.restart_debounce.as_millis() as u64, "Restart scheduled");
        self.restart_at = Some(at);
    }

    fn listening_state(&self) -> ListeningState {
        if self.gate_open() {
            ListeningState::Listening
        } else {
            ListeningState::Sleeping
        }
    }

    fn after_dispatch_state(&self) -> ListeningState {
        if self.adapter_running {
            self.listening_state()
        } else {
            ListeningState::Idle
        }
    }

    fn set_state(&mut self, state: ListeningState) {
        if self.state == state {
            return;
        }
        tracing::debug!(from = %self.state, to = %state, "Listening state changed");
        self.state = state;
        self.state_tx.send_replace(state);
        self.outputs.push(ControllerOutput::StateChanged(state));
    }
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
