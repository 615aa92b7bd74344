//! Configuration loading and management

mod io;
mod settings;

pub use io::write_atomic;
pub use settings::{AnalyticsSettings, StoreKind, VoiceSettings};

use serde::{Deserialize, Serialize};

/// Main configuration structure (`~/.voxport/config.toml`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listening, speech and dispatch settings
    #[serde(default)]
    pub voice: VoiceSettings,

    /// Analytics retention and storage settings
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}
