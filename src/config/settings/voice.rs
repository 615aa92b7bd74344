//! Voice engine settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::voice::{ControllerConfig, EngineConfig, SpeechOptions};

/// Voice engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Restart recognition automatically after each session ends
    #[serde(default = "default_continuous")]
    pub continuous: bool,

    /// Require the wake phrase ("hey AI") before commands are accepted
    #[serde(default)]
    pub wake_gating: bool,

    /// Delay before an automatic restart (milliseconds)
    #[serde(default = "default_restart_debounce_ms")]
    pub restart_debounce_ms: u64,

    /// Restart after recognition errors as well
    #[serde(default = "default_restart_on_error")]
    pub restart_on_error: bool,

    /// Suppress spoken responses
    #[serde(default)]
    pub muted: bool,

    /// Speech rate (1.0 = normal)
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f32,

    /// Speech volume (0.0-1.0)
    #[serde(default = "default_speech_volume")]
    pub speech_volume: f32,

    /// Preferred synthesis voice name, adapter default if unset
    #[serde(default)]
    pub voice: Option<String>,

    /// Recognition and synthesis language
    #[serde(default = "default_language")]
    pub language: String,

    /// Consecutive unmatched transcripts before the full help prompt is spoken
    #[serde(default = "default_no_match_repeat_threshold")]
    pub no_match_repeat_threshold: u32,

    /// Number of recent transcripts kept for display
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_continuous() -> bool {
    true
}

fn default_restart_debounce_ms() -> u64 {
    1000
}

fn default_restart_on_error() -> bool {
    true
}

fn default_speech_rate() -> f32 {
    1.0
}

fn default_speech_volume() -> f32 {
    0.8
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_no_match_repeat_threshold() -> u32 {
    3
}

fn default_history_size() -> usize {
    10
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            continuous: default_continuous(),
            wake_gating: false,
            restart_debounce_ms: default_restart_debounce_ms(),
            restart_on_error: default_restart_on_error(),
            muted: false,
            speech_rate: default_speech_rate(),
            speech_volume: default_speech_volume(),
            voice: None,
            language: default_language(),
            no_match_repeat_threshold: default_no_match_repeat_threshold(),
            history_size: default_history_size(),
        }
    }
}

impl VoiceSettings {
    pub fn speech_options(&self) -> SpeechOptions {
        SpeechOptions {
            rate: self.speech_rate,
            volume: self.speech_volume,
            voice: self.voice.clone(),
            lang: self.language.clone(),
            ..SpeechOptions::default()
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            continuous: self.continuous,
            wake_gating: self.wake_gating,
            restart_debounce: Duration::from_millis(self.restart_debounce_ms),
            restart_on_error: self.restart_on_error,
            speech: self.speech_options(),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            no_match_repeat_threshold: self.no_match_repeat_threshold,
            history_size: self.history_size,
            ..EngineConfig::default()
        }
    }
}
