//! Command definitions: a compiled pattern bound to an action.

use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::voice::error::VoiceError;

/// Callback bound to a command. Receives the pattern's capture groups in
/// order and may return a reply to speak instead of the command's
/// response template.
pub type ActionFn = Arc<dyn Fn(&[String]) -> anyhow::Result<Option<String>> + Send + Sync>;

/// What a successful match does besides running the action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    Action,
    /// Opens the wake gate
    Wake,
    /// Closes the wake gate
    Sleep,
}

/// Case-insensitive regex matched anywhere in a transcript
#[derive(Debug, Clone)]
pub struct CommandPattern {
    regex: Regex,
}

impl CommandPattern {
    pub fn compile(id: &str, pattern: &str) -> Result<Self, VoiceError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| VoiceError::InvalidPattern {
                id: id.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Capture groups (1..n) if the pattern matches. Groups that did not
    /// participate in the match are returned as empty strings.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A registered voice command
#[derive(Clone)]
pub struct CommandDefinition {
    pub id: String,
    pub pattern: CommandPattern,
    pub kind: CommandKind,
    pub description: String,
    pub examples: Vec<String>,
    /// Spoken after a successful action; `{1}`, `{2}`... are replaced by captures
    pub response: Option<String>,
    action: ActionFn,
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("id", &self.id)
            .field("pattern", &self.pattern.as_str())
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("examples", &self.examples)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

impl CommandDefinition {
    /// Create a command with a no-op action
    pub fn new(id: impl Into<String>, pattern: &str) -> Result<Self, VoiceError> {
        let id = id.into();
        let pattern = CommandPattern::compile(&id, pattern)?;
        Ok(Self {
            id,
            pattern,
            kind: CommandKind::Action,
            description: String::new(),
            examples: Vec::new(),
            response: None,
            action: Arc::new(|_| Ok(None)),
        })
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<Option<String>> + Send + Sync + 'static,
    {
        self.action = Arc::new(action);
        self
    }

    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Run the bound action
    pub fn invoke(&self, captures: &[String]) -> anyhow::Result<Option<String>> {
        (self.action)(captures)
    }

    /// Fill the response template with captures
    pub fn render_response(&self, captures: &[String]) -> Option<String> {
        let template = self.response.as_ref()?;
        let mut text = template.clone();
        for (i, value) in captures.iter().enumerate() {
            text = text.replace(&format!("{{{}}}", i + 1), value);
        }
        Some(text)
    }
}

/// Result of resolving a transcript
#[derive(Debug, Clone)]
pub struct CommandMatch {
    pub definition: CommandDefinition,
    pub captures: Vec<String>,
}
