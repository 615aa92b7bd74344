//! Ordered command registry with first-match-wins resolution.

use super::command::{CommandDefinition, CommandKind, CommandMatch};
use crate::voice::error::VoiceError;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Registry of voice commands, matched in registration order
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDefinition>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Fails without touching the registry if the id is taken.
    pub fn register(&mut self, definition: CommandDefinition) -> Result<(), VoiceError> {
        if self.contains(&definition.id) {
            return Err(VoiceError::DuplicateCommandId(definition.id));
        }
        tracing::debug!(id = %definition.id, pattern = %definition.pattern.as_str(), "Registered voice command");
        self.commands.push(definition);
        Ok(())
    }

    /// Register several commands, stopping at the first failure
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = CommandDefinition>,
    ) -> Result<(), VoiceError> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Remove a command. Returns false if no command had this id.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.commands.len();
        self.commands.retain(|c| c.id != id);
        before != self.commands.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.commands.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&CommandDefinition> {
        self.commands.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    /// Resolve a transcript to the first matching command
    pub fn resolve(&self, transcript: &str) -> Option<CommandMatch> {
        let normalized = normalize(transcript);
        self.commands.iter().find_map(|definition| {
            definition
                .pattern
                .captures(&normalized)
                .map(|captures| CommandMatch {
                    definition: definition.clone(),
                    captures,
                })
        })
    }

    /// True if the transcript matches any wake command
    pub fn is_wake(&self, transcript: &str) -> bool {
        let normalized = normalize(transcript);
        self.commands
            .iter()
            .filter(|c| c.kind == CommandKind::Wake)
            .any(|c| c.pattern.is_match(&normalized))
    }

    /// All examples, in registration order (for help output)
    pub fn examples(&self) -> Vec<&str> {
        self.commands
            .iter()
            .flat_map(|c| c.examples.iter().map(String::as_str))
            .collect()
    }

    /// The registered example closest to an unmatched transcript
    pub fn closest_example(&self, transcript: &str) -> Option<&str> {
        let normalized = normalize(transcript);
        self.examples()
            .into_iter()
            .map(|example| {
                (
                    example,
                    strsim::jaro_winkler(&normalized, &example.to_lowercase()),
                )
            })
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(example, _)| example)
    }
}

/// Lowercase and trim a transcript before matching
pub fn normalize(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}
