//! Voice engine state and event types.

use serde::{Deserialize, Serialize};

/// Listening state of the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListeningState {
    /// Adapter stopped
    #[default]
    Idle,
    /// Adapter running, transcripts reach the dispatcher
    Listening,
    /// A final transcript is being dispatched
    Processing,
    /// Spoken output in progress after a dispatch
    Speaking,
    /// Adapter running but the wake gate is closed (only the wake command passes)
    Sleeping,
}

impl ListeningState {
    /// Returns true if the adapter is expected to deliver transcripts
    pub fn is_listening(&self) -> bool {
        matches!(self, ListeningState::Listening | ListeningState::Sleeping)
    }
}

impl std::fmt::Display for ListeningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListeningState::Idle => write!(f, "Idle"),
            ListeningState::Listening => write!(f, "Listening"),
            ListeningState::Processing => write!(f, "Processing"),
            ListeningState::Speaking => write!(f, "Speaking"),
            ListeningState::Sleeping => write!(f, "Sleeping"),
        }
    }
}

/// Permanent capability status, decided once when the controller is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    Ready,
    Unsupported,
}

/// Callbacks delivered by the speech adapter
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    /// Recognition result (interim or final)
    Result {
        text: String,
        is_final: bool,
        confidence: f64,
    },
    /// Recognition failed; `kind` is the adapter's error name (e.g. "network")
    Error { kind: String },
    /// Recognition session ended
    End,
    /// The last utterance finished playing
    SpeechEnded,
}

impl AdapterEvent {
    pub fn final_result(text: impl Into<String>, confidence: f64) -> Self {
        Self::Result {
            text: text.into(),
            is_final: true,
            confidence,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self::Result {
            text: text.into(),
            is_final: false,
            confidence: 0.0,
        }
    }

    pub fn error(kind: impl Into<String>) -> Self {
        Self::Error { kind: kind.into() }
    }
}

/// What the controller hands to the rest of the engine after an event
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerOutput {
    /// Final transcript to dispatch
    Transcript { text: String, confidence: f64 },
    /// Interim transcript, for display only
    Interim { text: String },
    /// Final transcript dropped because the wake gate is closed
    Discarded { text: String },
    /// Recognition failed
    RecognitionError { kind: String },
    /// State changed
    StateChanged(ListeningState),
}

/// Options forwarded to the adapter with each utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechOptions {
    pub rate: f32,
    pub volume: f32,
    pub pitch: f32,
    pub voice: Option<String>,
    pub lang: String,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            volume: 1.0,
            pitch: 1.0,
            voice: None,
            lang: "en-US".to_string(),
        }
    }
}
