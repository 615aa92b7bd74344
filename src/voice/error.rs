//! Error types for the voice engine

/// Errors surfaced to callers of the voice engine.
///
/// Recognition failures, unmatched transcripts and action failures are not
/// errors from the caller's point of view: they are recorded as analytics
/// events (see [`error_kind`]) and never cross the engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("Speech recognition is not supported on this host")]
    UnsupportedCapability,

    #[error("A command with id '{0}' is already registered")]
    DuplicateCommandId(String),

    #[error("Invalid pattern for command '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

/// Error type values recorded on failed analytics events
pub mod error_kind {
    /// Transcript did not match any registered command
    pub const NO_MATCH: &str = "no_match";
    /// Matched action returned an error or panicked
    pub const PROCESSING_ERROR: &str = "processing_error";
    /// Adapter failed to start without naming a reason
    pub const START_FAILED: &str = "start_failed";
}
