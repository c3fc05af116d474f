//! Line processing scenarios through the public API
use filter_language_server::parser::{ElementKind, RuleName, RuleValue};
use filter_language_server::vocabulary::{ItemsFile, SoundsFile};
use filter_language_server::{Severity, Vocabulary, process_line, validate_document};

fn vocabulary() -> Vocabulary {
    let items: ItemsFile = serde_json::from_str(
        r#"{
            "Boots": ["Iron Greaves", "Sorcerer Boots"],
            "Rings": ["Gold Ring", "Two-Stone Ring"],
            "Currency": ["Chaos Orb", "Exalted Orb"]
        }"#,
    )
    .expect("items");
    let sounds: SoundsFile = serde_json::from_str(r#"{ "1": "AlertSound1", "orb": "OrbAlert" }"#)
        .expect("sounds");
    Vocabulary::from_files(&items, &sounds)
}

fn line(text: &str) -> filter_language_server::LineElement {
    process_line(text, 0, &vocabulary(), Some("test.filter")).expect("single line")
}

#[test]
fn test_class_values_in_vocabulary() {
    let element = line("Class \"Boots\" \"Rings\"");
    assert!(element.messages.is_empty());

    let rule = element.rule().expect("rule");
    match &rule.value {
        RuleValue::Strings(values) => {
            let names: Vec<_> = values.iter().map(|v| v.value.as_str()).collect();
            assert_eq!(names, vec!["Boots", "Rings"]);
        }
        other => panic!("Expected strings, got {:?}", other),
    }
}

#[test]
fn test_class_value_not_in_vocabulary() {
    let element = line("Class \"Boots\" \"NotReal\"");
    assert!(element.invalid);
    assert_eq!(element.messages.errors.len(), 1);

    let error = &element.messages.errors[0];
    // Range of the quoted value, quotes included.
    assert_eq!(error.range.start.column, 14);
    assert_eq!(error.range.end.column, 23);
    assert_eq!(error.file.as_deref(), Some("test.filter"));
}

#[test]
fn test_partial_base_type_is_info() {
    let element = line("BaseType Ring");
    assert!(!element.invalid);
    assert!(element.messages.errors.is_empty());
    assert_eq!(element.messages.info.len(), 1);
    assert_eq!(element.messages.info[0].severity, Severity::Info);
}

#[test]
fn test_item_level_boundaries() {
    assert!(line("ItemLevel 100").messages.is_empty());
    assert_eq!(line("ItemLevel 101").messages.errors.len(), 1);
    assert_eq!(line("ItemLevel").messages.errors.len(), 1);
    assert_eq!(line("LinkedSockets 1").messages.errors.len(), 1);
    assert!(line("LinkedSockets 0").messages.is_empty());
}

#[test]
fn test_alert_sounds() {
    assert!(line("PlayAlertSound 16").messages.is_empty());
    assert!(line("PlayAlertSound orb 300").messages.is_empty());
    assert_eq!(line("PlayAlertSound 17").messages.errors.len(), 1);
    assert_eq!(line("PlayAlertSound 1 301").messages.errors.len(), 1);
}

#[test]
fn test_colors_and_font_size() {
    let element = line("SetBackgroundColor 0 0 0 200 # dark");
    assert!(element.messages.is_empty());
    let rule = element.rule().expect("rule");
    assert_eq!(rule.name, RuleName::SetBackgroundColor);
    assert!(matches!(rule.value, RuleValue::Color(ref c) if c.alpha.is_some()));
    assert!(rule.trailing_comment.is_some());

    assert_eq!(line("SetTextColor 256 0 0").messages.errors.len(), 1);
    assert_eq!(line("SetFontSize 17").messages.errors.len(), 1);
}

#[test]
fn test_whole_filter() {
    let content = "\
# Currency
Show
    Class Currency
    BaseType \"Chaos Orb\" \"Exalted Orb\"
    SetFontSize 45
    PlayAlertSound 1

Hide
    Rarity <= Magic
    Identified True
";
    let elements = validate_document(content, &vocabulary(), None).expect("document");
    assert_eq!(elements.len(), 10);
    assert!(elements.iter().all(|element| !element.invalid));
    assert!(matches!(elements[0].kind, ElementKind::Comment(_)));
    assert!(matches!(elements[6].kind, ElementKind::Empty));
    assert!(elements[7].block().is_some());
}
