//! Speech I/O adapter seam.
//!
//! The engine never talks to a microphone or a synthesizer directly. Hosts
//! implement [`SpeechAdapter`] and feed its callbacks back to the engine as
//! [`AdapterEvent`](super::AdapterEvent) values.

use super::types::SpeechOptions;

/// Speech recognition and synthesis capability provided by the host
pub trait SpeechAdapter {
    /// Whether recognition is available at all. Checked once.
    fn is_supported(&self) -> bool;

    /// Begin a recognition session. The error value is the adapter's
    /// error kind (e.g. "not-allowed").
    fn start_listening(&mut self) -> Result<(), String>;

    /// End the current recognition session. Must tolerate being called
    /// when nothing is running.
    fn stop_listening(&mut self);

    /// Speak an utterance
    fn speak(&mut self, text: &str, options: &SpeechOptions);
}

/// Adapter for hosts without any speech capability
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedAdapter;

impl SpeechAdapter for UnsupportedAdapter {
    fn is_supported(&self) -> bool {
        false
    }

    fn start_listening(&mut self) -> Result<(), String> {
        Err("unsupported".to_string())
    }

    fn stop_listening(&mut self) {}

    fn speak(&mut self, _text: &str, _options: &SpeechOptions) {}
}
