//! Default command catalog
//!
//! The stock set of commands for the results dashboard. Actions do not touch
//! the host directly: they emit [`AppCommand`] values into an [`ActionSink`]
//! and the host consumes the other end of the channel.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;

use super::actions::{CommandDefinition, CommandKind, CommandRegistry};
use super::assistant::{self, FilterSpec};
use super::error::VoiceError;

/// Spoken when a transcript keeps failing to match
pub const HELP_PROMPT: &str = "I can help you filter data, activate the AI assistant, and export results. Try saying 'show high performers' or 'find struggling students'";

pub const WAKE_ACK: &str = "Yes, I'm listening. How can I help you with your data analysis?";
pub const SLEEP_ACK: &str = "Going to sleep. Say 'Hey AI' to wake me up.";

/// Request sent to the host application by a command action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppCommand {
    /// Apply (or with field "clear", remove) a filter
    Filter {
        field: String,
        params: serde_json::Value,
    },
    /// Assistant interaction with its reply and suggested filters
    Assistant {
        request: String,
        reply: String,
        filters: Option<Vec<FilterSpec>>,
    },
    /// Export the filtered results
    Export,
}

/// Sending half of the action channel
#[derive(Debug, Clone)]
pub struct ActionSink {
    tx: mpsc::UnboundedSender<AppCommand>,
}

impl ActionSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver a command. Fails once the host dropped the receiver.
    pub fn send(&self, command: AppCommand) -> anyhow::Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow!("Action receiver closed"))
    }
}

fn filter(sink: &ActionSink, field: &str, params: serde_json::Value) -> anyhow::Result<()> {
    sink.send(AppCommand::Filter {
        field: field.to_string(),
        params,
    })
}

/// Wake and sleep commands. Registered ahead of everything else so they
/// take precedence when gating is on.
pub fn gate_commands() -> Result<Vec<CommandDefinition>, VoiceError> {
    Ok(vec![
        CommandDefinition::new("wake_ai", r"(?:hey|hi|hello)\s+(?:ai|assistant|bot|jarvis)")?
            .with_kind(CommandKind::Wake)
            .with_description("Wake up the AI assistant")
            .with_example("Hey AI")
            .with_example("Hello assistant")
            .with_example("Hi bot")
            .with_response(WAKE_ACK),
        CommandDefinition::new("sleep_ai", r"\b(?:sleep|stop|quiet|goodbye|bye)\b")?
            .with_kind(CommandKind::Sleep)
            .with_description("Put AI assistant to sleep")
            .with_example("Sleep")
            .with_example("Stop")
            .with_example("Goodbye")
            .with_response(SLEEP_ACK),
    ])
}

/// Dashboard commands bound to `sink`
pub fn default_commands(sink: &ActionSink) -> Result<Vec<CommandDefinition>, VoiceError> {
    let mut commands = Vec::new();

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "filter_score",
            r"(?:show|find|filter)\s+(?:students?\s+)?(?:with\s+)?(?:score|scores?)\s+(?:above|over|greater than|more than)\s+(\d+)",
        )?
        .with_action(move |captures| {
            let score: u32 = captures
                .first()
                .ok_or_else(|| anyhow!("missing score"))?
                .parse()?;
            filter(&s, "score", json!({ "operator": ">=", "value": score }))?;
            Ok(Some(format!(
                "Filtering students with scores above {score} percent"
            )))
        })
        .with_description("Filter by score threshold")
        .with_example("Show students with score above 85")
        .with_example("Find students with scores over 90"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "filter_department",
            r"(?:show|find|filter)\s+(?:students?\s+)?(?:from|in)\s+(computer|electrical|mechanical|civil)\s+engineering",
        )?
        .with_action(move |captures| {
            let department = format!(
                "{} Engineering",
                capitalize(captures.first().map(String::as_str).unwrap_or_default())
            );
            filter(&s, "department", json!({ "operator": "=", "value": department }))?;
            Ok(Some(format!("Filtering students from {department}")))
        })
        .with_description("Filter by department")
        .with_example("Show students from computer engineering")
        .with_example("Find students in electrical engineering"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "filter_region",
            r"(?:show|find|filter)\s+(?:students?\s+)?(?:from|in)\s+(southwest|northwest|centre|littoral|west|east)",
        )?
        .with_action(move |captures| {
            let region = captures.first().cloned().unwrap_or_default();
            filter(&s, "region", json!({ "operator": "=", "value": region }))?;
            Ok(None)
        })
        .with_response("Filtering students from {1} region")
        .with_description("Filter by region")
        .with_example("Show students from southwest")
        .with_example("Find students in northwest"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "filter_high_performers",
            r"(?:show|find|display)\s+(?:high\s+performers?|top\s+students?|excellent\s+students?|best\s+students?)",
        )?
        .with_action(move |_| {
            filter(
                &s,
                "high_performers",
                json!({ "score": ">=85", "attendance": ">=90" }),
            )?;
            Ok(None)
        })
        .with_response(
            "Showing high-performing students with scores above 85% and attendance above 90%",
        )
        .with_description("Show high-performing students")
        .with_example("Show high performers")
        .with_example("Find top students")
        .with_example("Display excellent students"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "filter_struggling",
            r"(?:show|find|display)\s+(?:struggling|failing|low\s+performing|at\s+risk)\s+students?",
        )?
        .with_action(move |_| {
            filter(&s, "struggling", json!({ "score": "<60", "attendance": "<75" }))?;
            Ok(None)
        })
        .with_response("Showing struggling students who need support")
        .with_description("Show struggling students")
        .with_example("Show struggling students")
        .with_example("Find failing students")
        .with_example("Display at risk students"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new("clear_filters", r"(?:clear|remove|reset)\s+(?:all\s+)?filters?")?
            .with_action(move |_| {
                filter(&s, "clear", json!({}))?;
                Ok(None)
            })
            .with_response("All filters have been cleared")
            .with_description("Clear all filters")
            .with_example("Clear filters")
            .with_example("Remove all filters")
            .with_example("Reset filters"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new("ai_assistant", r"(?:hey|hi|hello)\s+(?:ai|assistant|bot)")?
            .with_action(move |_| {
                let reply = "AI assistant activated. How can I help you with your analysis?";
                s.send(AppCommand::Assistant {
                    request: "activate".to_string(),
                    reply: reply.to_string(),
                    filters: None,
                })?;
                Ok(Some(reply.to_string()))
            })
            .with_description("Activate AI assistant")
            .with_example("Hey AI")
            .with_example("Hello assistant")
            .with_example("Hi bot"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "ai_suggestions",
            r"(?:give|show|provide)\s+(?:me\s+)?(?:suggestions?|recommendations?|advice)",
        )?
        .with_action(move |_| {
            let reply = assistant::respond("suggestions");
            s.send(AppCommand::Assistant {
                request: "suggestions".to_string(),
                reply: reply.content.clone(),
                filters: reply.filters,
            })?;
            Ok(None)
        })
        .with_response("Here are some intelligent filter suggestions based on your usage patterns")
        .with_description("Get AI suggestions")
        .with_example("Give me suggestions")
        .with_example("Show recommendations")
        .with_example("Provide advice"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new(
            "ask_assistant",
            r"(?:ask|tell)\s+(?:the\s+)?(?:ai|assistant|bot)\s+(?:to\s+|about\s+)?(.+)",
        )?
        .with_action(move |captures| {
            let request = captures.first().cloned().unwrap_or_default();
            let reply = assistant::respond(&request);
            s.send(AppCommand::Assistant {
                request,
                reply: reply.content.clone(),
                filters: reply.filters,
            })?;
            Ok(Some(reply.content))
        })
        .with_description("Ask the AI assistant")
        .with_example("Ask the assistant about struggling students")
        .with_example("Tell the AI to show recent results"),
    );

    let s = sink.clone();
    commands.push(
        CommandDefinition::new("export_data", r"(?:export|download|save)\s+(?:the\s+)?(?:data|results?)")?
            .with_action(move |_| {
                s.send(AppCommand::Export)?;
                Ok(None)
            })
            .with_response("Exporting filtered data to CSV file")
            .with_description("Export filtered data")
            .with_example("Export data")
            .with_example("Download results")
            .with_example("Save the data"),
    );

    commands.push(
        CommandDefinition::new("help", r"(?:help|what\s+can\s+you\s+do|commands?|voice\s+commands?)")?
            .with_response(HELP_PROMPT)
            .with_description("Show help information")
            .with_example("Help")
            .with_example("What can you do")
            .with_example("Voice commands"),
    );

    Ok(commands)
}

/// Registry with the full catalog. Gate commands come first when
/// `wake_gating` is set.
pub fn default_registry(sink: &ActionSink, wake_gating: bool) -> Result<CommandRegistry, VoiceError> {
    let mut registry = CommandRegistry::new();
    if wake_gating {
        registry.register_all(gate_commands()?)?;
    }
    registry.register_all(default_commands(sink)?)?;
    Ok(registry)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (CommandRegistry, mpsc::UnboundedReceiver<AppCommand>) {
        let (sink, rx) = ActionSink::channel();
        (default_registry(&sink, false).unwrap(), rx)
    }

    fn run(registry: &CommandRegistry, text: &str) -> (String, Option<String>) {
        let m = registry.resolve(text).unwrap();
        let reply = m
            .definition
            .invoke(&m.captures)
            .unwrap()
            .or_else(|| m.definition.render_response(&m.captures));
        (m.definition.id, reply)
    }

    #[test]
    fn test_catalog_ids_in_order() {
        let (registry, _rx) = registry();
        let ids: Vec<&str> = registry.commands().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "filter_score",
                "filter_department",
                "filter_region",
                "filter_high_performers",
                "filter_struggling",
                "clear_filters",
                "ai_assistant",
                "ai_suggestions",
                "ask_assistant",
                "export_data",
                "help",
            ]
        );
    }

    #[test]
    fn test_gate_commands_registered_first() {
        let (sink, _rx) = ActionSink::channel();
        let registry = default_registry(&sink, true).unwrap();
        assert_eq!(registry.commands()[0].id, "wake_ai");
        assert_eq!(registry.commands()[1].id, "sleep_ai");
        assert_eq!(registry.resolve("hey AI").unwrap().definition.id, "wake_ai");
        assert!(registry.is_wake("Hello assistant"));
    }

    #[test]
    fn test_every_example_resolves_to_its_command() {
        let (registry, _rx) = registry();
        for command in registry.commands() {
            for example in &command.examples {
                let resolved = registry.resolve(example).unwrap();
                assert_eq!(resolved.definition.id, command.id, "example {example:?}");
            }
        }
    }

    #[test]
    fn test_filter_score_emits_filter() {
        let (registry, mut rx) = registry();
        let (id, reply) = run(&registry, "Show students with score above 85");

        assert_eq!(id, "filter_score");
        assert_eq!(
            reply.as_deref(),
            Some("Filtering students with scores above 85 percent")
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            AppCommand::Filter {
                field: "score".to_string(),
                params: json!({ "operator": ">=", "value": 85 }),
            }
        );
    }

    #[test]
    fn test_department_capitalized() {
        let (registry, mut rx) = registry();
        let (_, reply) = run(&registry, "find students in civil engineering");

        assert_eq!(reply.as_deref(), Some("Filtering students from Civil Engineering"));
        match rx.try_recv().unwrap() {
            AppCommand::Filter { field, params } => {
                assert_eq!(field, "department");
                assert_eq!(params["value"], "Civil Engineering");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_region_response_template() {
        let (registry, _rx) = registry();
        let (_, reply) = run(&registry, "show students from littoral");
        assert_eq!(reply.as_deref(), Some("Filtering students from littoral region"));
    }

    #[test]
    fn test_ask_assistant_uses_rules() {
        let (registry, mut rx) = registry();
        let (id, reply) = run(&registry, "ask the assistant about struggling students");

        assert_eq!(id, "ask_assistant");
        assert!(reply.unwrap().contains("struggling students"));
        match rx.try_recv().unwrap() {
            AppCommand::Assistant { request, filters, .. } => {
                assert_eq!(request, "struggling students");
                assert_eq!(filters.unwrap().len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_closed_sink_fails_action() {
        let (registry, rx) = registry();
        drop(rx);
        let m = registry.resolve("export data").unwrap();
        assert!(m.definition.invoke(&m.captures).is_err());
    }

    #[test]
    fn test_app_command_json_tag() {
        let json = serde_json::to_value(AppCommand::Export).unwrap();
        assert_eq!(json, json!({ "type": "export" }));
    }
}
