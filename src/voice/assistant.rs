//! Keyword rules for the voice assistant
//!
//! The assistant does not understand language. It scans the request for
//! keywords, walks [`RULES`] in order and answers with the first rule that
//! applies, optionally suggesting filters for the host to apply.

use serde::{Deserialize, Serialize};

/// A filter the host application is asked to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub operator: String,
    pub value: serde_json::Value,
    pub display: String,
}

/// Assistant answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub content: String,
    /// `Some(vec![])` means "clear all filters"; `None` leaves filters alone
    pub filters: Option<Vec<FilterSpec>>,
}

#[derive(Debug, Clone, Copy)]
enum Value {
    Number(i64),
    Text(&'static str),
    /// The matched subject, capitalized, followed by the given suffix
    Subject(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct FilterTemplate {
    field: &'static str,
    operator: &'static str,
    value: Value,
    display: &'static str,
}

/// One keyword rule.
///
/// Every group in `requires` needs at least one keyword present. When
/// `subjects` is non-empty one of them must also appear; it replaces
/// `{subject}` in the reply and `{Subject}` in filter displays.
#[derive(Debug, Clone, Copy)]
struct Rule {
    requires: &'static [&'static [&'static str]],
    subjects: &'static [&'static str],
    reply: &'static str,
    filters: Option<&'static [FilterTemplate]>,
}

const DEPARTMENTS: &[&str] = &["computer", "electrical", "mechanical", "civil"];

const RULES: &[Rule] = &[
    Rule {
        requires: &[&["high"], &["perform", "score"]],
        subjects: &[],
        reply: "I found some excellent students for you. I'm applying filters for high performers with scores above 85% and good attendance.",
        filters: Some(&[
            FilterTemplate {
                field: "score",
                operator: ">=",
                value: Value::Number(85),
                display: "Score ≥ 85%",
            },
            FilterTemplate {
                field: "attendance",
                operator: ">=",
                value: Value::Number(90),
                display: "Attendance ≥ 90%",
            },
        ]),
    },
    Rule {
        requires: &[&["struggling", "help", "support"]],
        subjects: &[],
        reply: "I understand you want to help struggling students. Let me show you students who might need extra support.",
        filters: Some(&[
            FilterTemplate {
                field: "score",
                operator: "<",
                value: Value::Number(60),
                display: "Score < 60%",
            },
            FilterTemplate {
                field: "attendance",
                operator: "<",
                value: Value::Number(75),
                display: "Attendance < 75%",
            },
        ]),
    },
    Rule {
        requires: &[&["department", "engineering"]],
        subjects: DEPARTMENTS,
        reply: "Great choice! I'm filtering students from {subject} engineering department.",
        filters: Some(&[FilterTemplate {
            field: "department",
            operator: "=",
            value: Value::Subject(" Engineering"),
            display: "{Subject} Engineering",
        }]),
    },
    Rule {
        requires: &[&["clear", "reset", "remove"]],
        subjects: &[],
        reply: "All filters have been cleared. You now see all students in the system.",
        filters: Some(&[]),
    },
    Rule {
        requires: &[&["export", "download", "save"]],
        subjects: &[],
        reply: "I'm preparing your data export. The CSV file will download shortly with all filtered results.",
        filters: None,
    },
    Rule {
        requires: &[&["suggestion", "recommend", "advice"]],
        subjects: &[],
        reply: "Based on your usage patterns, I recommend analyzing high performers in computer engineering. This combination often reveals interesting insights.",
        filters: Some(&[
            FilterTemplate {
                field: "department",
                operator: "=",
                value: Value::Text("Computer Engineering"),
                display: "Computer Engineering",
            },
            FilterTemplate {
                field: "score",
                operator: ">=",
                value: Value::Number(80),
                display: "Score ≥ 80%",
            },
        ]),
    },
    Rule {
        requires: &[&["recent", "latest", "new"]],
        subjects: &[],
        reply: "I'm showing you the most recent examination data from the last 30 days.",
        filters: Some(&[FilterTemplate {
            field: "date",
            operator: ">=",
            value: Value::Text("last30days"),
            display: "Last 30 days",
        }]),
    },
];

/// Reply when no rule applies
pub const DEFAULT_REPLY: &str = "I'm here to help! You can ask me to show high performers, find struggling students, filter by department, or get suggestions. What would you like to analyze?";

/// Answer a request with the first applicable rule
pub fn respond(request: &str) -> AssistantReply {
    let request = request.to_lowercase();
    RULES
        .iter()
        .find_map(|rule| rule.apply(&request))
        .unwrap_or_else(|| AssistantReply {
            content: DEFAULT_REPLY.to_string(),
            filters: None,
        })
}

impl Rule {
    fn apply(&self, request: &str) -> Option<AssistantReply> {
        let matches = self
            .requires
            .iter()
            .all(|group| group.iter().any(|keyword| request.contains(keyword)));
        if !matches {
            return None;
        }

        let subject = if self.subjects.is_empty() {
            ""
        } else {
            self.subjects.iter().copied().find(|s| request.contains(s))?
        };
        let capitalized = capitalize(subject);

        let filters = self.filters.map(|templates| {
            templates
                .iter()
                .map(|t| FilterSpec {
                    field: t.field.to_string(),
                    operator: t.operator.to_string(),
                    value: match t.value {
                        Value::Number(n) => serde_json::Value::from(n),
                        Value::Text(text) => serde_json::Value::from(text),
                        Value::Subject(suffix) => {
                            serde_json::Value::from(format!("{capitalized}{suffix}"))
                        }
                    },
                    display: t.display.replace("{Subject}", &capitalized),
                })
                .collect()
        });

        Some(AssistantReply {
            content: self.reply.replace("{subject}", subject),
            filters,
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
