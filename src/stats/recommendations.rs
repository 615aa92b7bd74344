//! Optimization rules
//!
//! Recommendations are derived from a snapshot by two fixed rules: commands
//! with a low success rate, and the most frequent error types. Remedies for
//! error types live in a lookup table.

use super::models::{AnalyticsSnapshot, Priority, Recommendation, RecommendationKind};

/// How many error types get a recommendation
const TOP_ERRORS: usize = 3;
/// Error share (percent of failures) above which an error is high priority
const HIGH_PRIORITY_ERROR_SHARE: f64 = 20.0;

const LOW_SUCCESS_REMEDY: &str = "Consider adding alternative phrases or improving pattern matching";
const GENERIC_REMEDY: &str = "Review command patterns and user feedback";

const NETWORK_REMEDY: &str = "Check internet connection stability";
const PERMISSION_REMEDY: &str = "Ensure microphone permissions are granted";
const TIMEOUT_REMEDY: &str = "Increase listening timeout or provide clearer instructions";

/// Error type to remediation text. Raw recognizer kinds ("network",
/// "not-allowed", ...) share the row of the error they stand for.
const ERROR_REMEDIES: &[(&str, &str)] = &[
    (
        "low_confidence",
        "Improve microphone quality or reduce background noise",
    ),
    (
        "no_match",
        "Add more command variations or improve pattern matching",
    ),
    ("timeout", TIMEOUT_REMEDY),
    ("no-speech", TIMEOUT_REMEDY),
    ("network_error", NETWORK_REMEDY),
    ("network", NETWORK_REMEDY),
    ("permission_denied", PERMISSION_REMEDY),
    ("not-allowed", PERMISSION_REMEDY),
    ("service-not-allowed", PERMISSION_REMEDY),
];

/// Remedy text for an error type
pub fn remedy_for(error_type: &str) -> &'static str {
    ERROR_REMEDIES
        .iter()
        .find(|(kind, _)| *kind == error_type)
        .map(|(_, remedy)| *remedy)
        .unwrap_or(GENERIC_REMEDY)
}

/// Apply all rules to a snapshot. Low-success commands come first, then
/// error types in frequency order.
pub fn generate(snapshot: &AnalyticsSnapshot, low_success_threshold: f64) -> Vec<Recommendation> {
    let commands = snapshot
        .most_used_commands
        .iter()
        .filter(|usage| usage.success_rate < low_success_threshold)
        .map(|usage| Recommendation {
            kind: RecommendationKind::CommandOptimization,
            target: usage.command.clone(),
            issue: format!("Low success rate ({:.1}%)", usage.success_rate),
            suggestion: LOW_SUCCESS_REMEDY.to_string(),
            priority: Priority::High,
        });

    let errors = snapshot
        .error_patterns
        .iter()
        .take(TOP_ERRORS)
        .map(|pattern| Recommendation {
            kind: RecommendationKind::ErrorReduction,
            target: pattern.error.clone(),
            issue: format!(
                "Frequent error: {} ({:.1}% of failures)",
                pattern.error, pattern.percentage
            ),
            suggestion: remedy_for(&pattern.error).to_string(),
            priority: if pattern.percentage > HIGH_PRIORITY_ERROR_SHARE {
                Priority::High
            } else {
                Priority::Medium
            },
        });

    commands.chain(errors).collect()
}
