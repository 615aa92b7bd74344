//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

use voxport::config::{Config, write_atomic};

/// Default configuration content for voxport init
pub const DEFAULT_CONFIG: &str = r#"# Voxport Configuration
# =====================

# ============================================================================
# VOICE - Listening, speech output and dispatch
# ============================================================================
#
# Available options:
#   continuous                - Restart recognition after each session ends (default: true)
#   wake_gating               - Ignore commands until "Hey AI" is heard (default: false)
#   restart_debounce_ms       - Delay before an automatic restart (default: 1000)
#   restart_on_error          - Also restart after recognition errors (default: true)
#   muted                     - Suppress spoken replies (default: false)
#   no_match_repeat_threshold - Misses in a row before the full help prompt (default: 3)
#   history_size              - Transcripts kept in history (default: 10)

[voice]
continuous = true
wake_gating = false
restart_debounce_ms = 1000
restart_on_error = true
muted = false
speech_rate = 1.0
speech_volume = 0.8
language = "en-US"
# voice = "Samantha"
no_match_repeat_threshold = 3
history_size = 10

# ============================================================================
# ANALYTICS - Event retention, statistics windows and recommendations
# ============================================================================
#
# Available options:
#   store                 - "sqlite" or "memory" (default: sqlite)
#   db_path               - SQLite file (default: ~/.voxport/analytics.db)
#   recommend_every       - Recompute recommendations every N events (default: 1)
#   low_success_threshold - Success rate (percent) below which a command is flagged

[analytics]
store = "sqlite"
event_capacity = 1000
session_capacity = 100
window_days = 30
engagement_days = 7
low_success_threshold = 70.0
recommend_every = 1
"#;

/// Write the default configuration
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    write_atomic(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_matches_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(config.voice.continuous, defaults.voice.continuous);
        assert_eq!(config.voice.restart_debounce_ms, defaults.voice.restart_debounce_ms);
        assert_eq!(config.voice.speech_volume, defaults.voice.speech_volume);
        assert_eq!(config.analytics.event_capacity, defaults.analytics.event_capacity);
        assert_eq!(config.analytics.store, defaults.analytics.store);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init_command(Some(path.clone()), false).unwrap();
        assert!(path.exists());
        assert!(init_command(Some(path.clone()), false).is_err());
        init_command(Some(path), true).unwrap();
    }
}
