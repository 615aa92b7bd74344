//! Voice command engine
//!
//! Turns recognized speech into application actions:
//!
//! - [`SessionController`] runs the listening state machine around a
//!   [`SpeechAdapter`] (continuous restart, wake/sleep gate, mute)
//! - [`CommandRegistry`] resolves transcripts to commands, first match wins
//! - [`VoiceEngine`] dispatches matched commands and records every attempt
//!   in [`VoiceAnalytics`](crate::stats::VoiceAnalytics)
//! - [`runtime::drive`] runs an engine on a tokio task

mod actions;
mod adapter;
pub mod assistant;
pub mod catalog;
mod controller;
mod engine;
mod error;
pub mod runtime;
mod types;

pub use actions::{
    ActionFn, CommandDefinition, CommandKind, CommandMatch, CommandPattern, CommandRegistry,
    normalize,
};
pub use adapter::{SpeechAdapter, UnsupportedAdapter};
pub use assistant::{AssistantReply, FilterSpec};
pub use catalog::{ActionSink, AppCommand};
pub use controller::{ControllerConfig, SessionController};
pub use engine::{DispatchContext, DispatchOutcome, EngineConfig, RECOGNITION_COMMAND, VoiceEngine};
pub use error::{VoiceError, error_kind};
pub use runtime::{EngineInput, drive};
pub use types::{AdapterEvent, ControllerOutput, ControllerStatus, ListeningState, SpeechOptions};
