//! Voice engine: the composition point of the voice subsystem.
//!
//! Owns the session controller, the command registry and the analytics
//! service. Adapter callbacks go in through [`VoiceEngine::handle`]; the
//! engine drains the controller's outputs, dispatches final transcripts and
//! records one analytics event per dispatch attempt or recognition error.
//! Nothing in here returns an error for a failed command: failures become
//! analytics events and spoken fallbacks.

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::actions::{CommandKind, CommandRegistry, normalize};
use super::adapter::SpeechAdapter;
use super::catalog::HELP_PROMPT;
use super::controller::SessionController;
use super::error::{VoiceError, error_kind};
use super::types::{AdapterEvent, ControllerOutput, ControllerStatus, ListeningState};
use crate::config::VoiceSettings;
use crate::stats::{EventContext, NewCommandEvent, VoiceAnalytics};

/// Command value recorded for recognition errors
pub const RECOGNITION_COMMAND: &str = "recognition";

/// Dispatcher settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Consecutive misses before the full help prompt is spoken
    pub no_match_repeat_threshold: u32,
    /// Final transcripts kept in history
    pub history_size: usize,
    pub help_prompt: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            no_match_repeat_threshold: 3,
            history_size: 10,
            help_prompt: HELP_PROMPT.to_string(),
        }
    }
}

/// Who is speaking and where; copied onto every analytics event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchContext {
    pub user_id: String,
    pub user_role: String,
    pub page_url: String,
    pub session_id: String,
    pub device_type: String,
    pub browser_type: String,
    pub current_filters: Vec<serde_json::Value>,
}

impl DispatchContext {
    fn event_context(&self) -> EventContext {
        EventContext {
            current_filters: self.current_filters.clone(),
            page_url: self.page_url.clone(),
            session_id: self.session_id.clone(),
            device_type: self.device_type.clone(),
            browser_type: self.browser_type.clone(),
        }
    }
}

/// Result of dispatching one final transcript
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Executed {
        command: String,
        captures: Vec<String>,
        reply: Option<String>,
    },
    NoMatch {
        transcript: String,
        suggestion: Option<String>,
    },
    Failed {
        command: String,
        error: String,
    },
}

pub struct VoiceEngine {
    controller: SessionController,
    registry: CommandRegistry,
    analytics: VoiceAnalytics,
    context: DispatchContext,
    config: EngineConfig,
    history: VecDeque<String>,
    interim: Option<String>,
    consecutive_no_match: u32,
    outcomes: Vec<DispatchOutcome>,
}

impl VoiceEngine {
    pub fn new(
        controller: SessionController,
        registry: CommandRegistry,
        analytics: VoiceAnalytics,
        config: EngineConfig,
    ) -> Self {
        Self {
            controller,
            registry,
            analytics,
            context: DispatchContext::default(),
            config,
            history: VecDeque::new(),
            interim: None,
            consecutive_no_match: 0,
            outcomes: Vec::new(),
        }
    }

    /// Build the controller from settings around `adapter`
    pub fn with_settings(
        adapter: Box<dyn SpeechAdapter + Send>,
        settings: &VoiceSettings,
        registry: CommandRegistry,
        analytics: VoiceAnalytics,
    ) -> Self {
        let mut controller = SessionController::new(adapter, settings.controller_config());
        controller.set_muted(settings.muted);
        Self::new(controller, registry, analytics, settings.engine_config())
    }

    pub fn status(&self) -> ControllerStatus {
        self.controller.status()
    }

    pub fn state(&self) -> ListeningState {
        self.controller.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ListeningState> {
        self.controller.subscribe_state()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn analytics(&self) -> &VoiceAnalytics {
        &self.analytics
    }

    pub fn analytics_mut(&mut self) -> &mut VoiceAnalytics {
        &mut self.analytics
    }

    pub fn context(&self) -> &DispatchContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut DispatchContext {
        &mut self.context
    }

    /// Recent final transcripts, most recent first
    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    /// Latest interim transcript of the current utterance
    pub fn interim(&self) -> Option<&str> {
        self.interim.as_deref()
    }

    /// Take dispatch outcomes produced since the last call
    pub fn drain_outcomes(&mut self) -> Vec<DispatchOutcome> {
        std::mem::take(&mut self.outcomes)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.controller.next_deadline()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.controller.set_muted(muted);
    }

    /// Open an analytics session for `user_id` and start listening
    pub fn start_voice_mode(&mut self, user_id: &str) -> Result<(), VoiceError> {
        if !self.controller.is_supported() {
            return Err(VoiceError::UnsupportedCapability);
        }
        self.context.user_id = user_id.to_string();
        self.context.session_id = self.analytics.start_session(user_id);
        self.consecutive_no_match = 0;
        info!(user_id, session_id = %self.context.session_id, "Voice mode on");

        self.controller.start_listening()?;
        self.process_outputs();
        Ok(())
    }

    /// Stop listening, close the wake gate and close the analytics session
    pub fn stop_voice_mode(&mut self) {
        self.controller.stop_listening();
        self.controller.set_activated(false);
        self.process_outputs();
        if let Some(session) = self.analytics.end_session() {
            info!(
                session_id = %session.id,
                commands = session.total_commands,
                "Voice mode off"
            );
        }
    }

    /// Restart listening without touching the session
    pub fn start_listening(&mut self) -> Result<(), VoiceError> {
        self.controller.start_listening()?;
        self.process_outputs();
        Ok(())
    }

    pub fn stop_listening(&mut self) {
        self.controller.stop_listening();
        self.process_outputs();
    }

    pub fn handle(&mut self, event: AdapterEvent) {
        self.handle_at(event, Instant::now());
    }

    /// Feed an adapter callback observed at `now`
    pub fn handle_at(&mut self, event: AdapterEvent, now: Instant) {
        self.controller.handle(event, now, &self.registry);
        self.process_outputs();
    }

    /// Fire timers that are due
    pub fn poll(&mut self, now: Instant) {
        self.controller.poll(now);
        self.process_outputs();
    }

    fn process_outputs(&mut self) {
        loop {
            let outputs = self.controller.drain_outputs();
            if outputs.is_empty() {
                break;
            }
            for output in outputs {
                match output {
                    ControllerOutput::Transcript { text, confidence } => {
                        self.interim = None;
                        let outcome = self.dispatch(&text, confidence);
                        self.controller.dispatch_complete();
                        self.outcomes.push(outcome);
                    }
                    ControllerOutput::Interim { text } => self.interim = Some(text),
                    ControllerOutput::Discarded { text } => {
                        self.interim = None;
                        debug!(text = %text, "Transcript discarded");
                    }
                    ControllerOutput::RecognitionError { kind } => {
                        self.interim = None;
                        self.track(RECOGNITION_COMMAND, "", 0.0, Instant::now(), Some(kind));
                    }
                    ControllerOutput::StateChanged(_) => {}
                }
            }
        }
    }

    /// Resolve and run a final transcript. Never fails; every path records
    /// exactly one analytics event.
    fn dispatch(&mut self, text: &str, confidence: f64) -> DispatchOutcome {
        let started = Instant::now();
        let normalized = normalize(text);

        self.history.push_front(text.to_string());
        self.history.truncate(self.config.history_size);

        let Some(matched) = self.registry.resolve(text) else {
            return self.no_match(text, normalized, confidence, started);
        };
        self.consecutive_no_match = 0;

        let definition = &matched.definition;
        let result = catch_unwind(AssertUnwindSafe(|| definition.invoke(&matched.captures)))
            .unwrap_or_else(|panic| Err(anyhow::anyhow!(panic_message(panic.as_ref()))));

        match result {
            Ok(reply) => {
                match definition.kind {
                    CommandKind::Wake => self.controller.set_activated(true),
                    CommandKind::Sleep => self.controller.set_activated(false),
                    CommandKind::Action => {}
                }
                let reply = reply.or_else(|| definition.render_response(&matched.captures));
                if let Some(reply) = reply.as_deref() {
                    self.controller.speak(reply);
                }
                info!(command = %definition.id, captures = ?matched.captures, "Voice command executed");
                self.track(&definition.id, text, confidence, started, None);
                DispatchOutcome::Executed {
                    command: definition.id.clone(),
                    captures: matched.captures.clone(),
                    reply,
                }
            }
            Err(err) => {
                warn!(command = %definition.id, error = %err, "Voice command failed");
                self.track(
                    &definition.id,
                    text,
                    confidence,
                    started,
                    Some(error_kind::PROCESSING_ERROR.to_string()),
                );
                DispatchOutcome::Failed {
                    command: definition.id.clone(),
                    error: err.to_string(),
                }
            }
        }
    }

    fn no_match(
        &mut self,
        text: &str,
        normalized: String,
        confidence: f64,
        started: Instant,
    ) -> DispatchOutcome {
        self.consecutive_no_match += 1;
        let suggestion = self.registry.closest_example(text).map(str::to_string);
        debug!(
            transcript = %normalized,
            misses = self.consecutive_no_match,
            "No command matched"
        );

        let prompt = if self.consecutive_no_match >= self.config.no_match_repeat_threshold.max(1) {
            self.consecutive_no_match = 0;
            self.config.help_prompt.clone()
        } else {
            match &suggestion {
                Some(example) => format!("Sorry, I didn't catch that. Try saying '{example}'."),
                None => "Sorry, I didn't catch that.".to_string(),
            }
        };
        self.controller.speak(&prompt);

        self.track(
            &normalized,
            text,
            confidence,
            started,
            Some(error_kind::NO_MATCH.to_string()),
        );
        DispatchOutcome::NoMatch {
            transcript: normalized,
            suggestion,
        }
    }

    fn track(
        &mut self,
        command: &str,
        text: &str,
        confidence: f64,
        started: Instant,
        error_type: Option<String>,
    ) {
        let event = NewCommandEvent {
            user_id: self.context.user_id.clone(),
            user_role: self.context.user_role.clone(),
            command: command.to_string(),
            recognized_text: text.to_string(),
            confidence,
            success: error_type.is_none(),
            execution_time_ms: started.elapsed().as_millis() as u64,
            error_type,
            context: self.context.event_context(),
        };
        self.analytics.track_command(event);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("action panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("action panicked: {message}")
    } else {
        "action panicked".to_string()
    }
}
