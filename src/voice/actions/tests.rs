use super::*;
use crate::voice::VoiceError;

fn scenario_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    registry
        .register(
            CommandDefinition::new("filter_score", r"show students with score above (\d+)")
                .unwrap()
                .with_example("Show students with score above 85"),
        )
        .unwrap();
    registry
        .register(
            CommandDefinition::new("clear_filters", r"clear filters")
                .unwrap()
                .with_example("Clear filters"),
        )
        .unwrap();
    registry
}

#[test]
fn test_resolve_with_capture() {
    let registry = scenario_registry();

    let m = registry.resolve("show students with score above 85").unwrap();
    assert_eq!(m.definition.id, "filter_score");
    assert_eq!(m.captures, vec!["85".to_string()]);
}

#[test]
fn test_resolve_partial_transcript() {
    let registry = scenario_registry();

    let m = registry.resolve("please clear filters now").unwrap();
    assert_eq!(m.definition.id, "clear_filters");
    assert!(m.captures.is_empty());
}

#[test]
fn test_resolve_no_match() {
    let registry = scenario_registry();
    assert!(registry.resolve("good morning").is_none());
}

#[test]
fn test_resolve_is_case_insensitive() {
    let registry = scenario_registry();

    let m = registry.resolve("  SHOW Students With Score Above 90 ").unwrap();
    assert_eq!(m.definition.id, "filter_score");
    assert_eq!(m.captures, vec!["90".to_string()]);
}

#[test]
fn test_first_registered_match_wins() {
    let mut registry = CommandRegistry::new();
    registry
        .register(CommandDefinition::new("broad", r"show").unwrap())
        .unwrap();
    registry
        .register(CommandDefinition::new("specific", r"show high performers").unwrap())
        .unwrap();

    let m = registry.resolve("show high performers").unwrap();
    assert_eq!(m.definition.id, "broad");
}

#[test]
fn test_resolve_is_deterministic() {
    let registry = scenario_registry();
    let inputs = ["show students with score above 70", "clear filters", "hello"];

    for input in inputs {
        let first = registry.resolve(input).map(|m| (m.definition.id, m.captures));
        for _ in 0..5 {
            let again = registry.resolve(input).map(|m| (m.definition.id, m.captures));
            assert_eq!(first, again);
        }
    }
}

#[test]
fn test_duplicate_id_leaves_registry_unchanged() {
    let mut registry = scenario_registry();

    let err = registry
        .register(CommandDefinition::new("clear_filters", r"reset everything").unwrap())
        .unwrap_err();
    assert!(matches!(err, VoiceError::DuplicateCommandId(ref id) if id == "clear_filters"));

    assert_eq!(registry.len(), 2);
    assert!(registry.resolve("reset everything").is_none());
    assert_eq!(registry.get("clear_filters").unwrap().pattern.as_str(), "clear filters");
}

#[test]
fn test_invalid_pattern() {
    let err = CommandDefinition::new("broken", r"show (\d+").unwrap_err();
    assert!(matches!(err, VoiceError::InvalidPattern { ref id, .. } if id == "broken"));
}

#[test]
fn test_unregister() {
    let mut registry = scenario_registry();

    assert!(registry.unregister("clear_filters"));
    assert!(!registry.unregister("clear_filters"));
    assert!(registry.resolve("clear filters").is_none());
}

#[test]
fn test_optional_group_yields_empty_capture() {
    let def = CommandDefinition::new("opt", r"export(?: the (data|results))?").unwrap();

    assert_eq!(def.pattern.captures("export").unwrap(), vec![String::new()]);
    assert_eq!(
        def.pattern.captures("export the data").unwrap(),
        vec!["data".to_string()]
    );
}

#[test]
fn test_render_response() {
    let def = CommandDefinition::new("filter_score", r"above (\d+)")
        .unwrap()
        .with_response("Filtering students with scores above {1} percent");

    assert_eq!(
        def.render_response(&["85".to_string()]).unwrap(),
        "Filtering students with scores above 85 percent"
    );
}

#[test]
fn test_is_wake() {
    let mut registry = scenario_registry();
    registry
        .register(
            CommandDefinition::new("wake_ai", r"(?:hey|hi|hello)\s+(?:ai|assistant)")
                .unwrap()
                .with_kind(CommandKind::Wake),
        )
        .unwrap();

    assert!(registry.is_wake("Hey AI"));
    assert!(!registry.is_wake("clear filters"));
}

#[test]
fn test_closest_example() {
    let registry = scenario_registry();

    assert_eq!(registry.closest_example("clear filter"), Some("Clear filters"));
    assert_eq!(registry.closest_example("zzzz"), None);
}
