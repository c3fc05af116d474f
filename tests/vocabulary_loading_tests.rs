//! Configuration and vocabulary loading from disk
use std::time::Duration;

use filter_language_server::config::{Args, Config, PROJECT_CONFIG_FILE};
use filter_language_server::vocabulary::{
    ITEMS_FILE, SOUNDS_FILE, ValueMatch, VocabularyManager, VocabularySource,
};
use filter_language_server::{Severity, process_line};

#[tokio::test]
async fn test_project_whitelist_reaches_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join(PROJECT_CONFIG_FILE),
        "[whitelist]\nclasses = [\"Incubator\"]\n",
    )
    .expect("write config");

    let args = Args {
        data_dir: Some(dir.path().join("missing-data")),
        base_whitelist: vec!["Replica Shavronne's Wrappings".to_string()],
        log_level: "info".to_string(),
        ..Args::default()
    };
    let config = Config::from_args_in(args, dir.path()).expect("config");
    let vocabulary = VocabularySource::from_config(&config).load().await;

    let element = process_line("Class Incubator Boots", 0, &vocabulary, None).expect("line");
    assert!(element.messages.is_empty());

    let element = process_line(
        "BaseType \"Replica Shavronne's Wrappings\" \"Nope\"",
        0,
        &vocabulary,
        None,
    )
    .expect("line");
    assert_eq!(element.messages.errors.len(), 1);
    assert_eq!(element.messages.errors[0].severity, Severity::Error);
}

#[tokio::test]
async fn test_data_dir_overrides_per_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(SOUNDS_FILE), r#"{ "3": "AlertSound3" }"#)
        .expect("write sounds");

    let source = VocabularySource::new(Some(dir.path().to_path_buf()), Default::default());
    let vocabulary = source.load().await;

    assert!(vocabulary.has_sound("3"));
    assert!(!vocabulary.has_sound("orb"));
    // items.json is absent, so the built-in classes remain.
    assert_eq!(vocabulary.match_class("Currency"), ValueMatch::Exact);
}

#[tokio::test]
async fn test_manager_reloads_on_file_change() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(ITEMS_FILE), r#"{ "Boots": ["Iron Greaves"] }"#)
        .expect("write items");

    let source = VocabularySource::new(Some(dir.path().to_path_buf()), Default::default());
    let mut manager = VocabularyManager::new(source);
    manager.initialize().await.expect("initialize");
    assert_eq!(manager.current().await.match_class("Trinkets"), ValueMatch::None);

    let mut updates = manager
        .watch()
        .await
        .expect("watch")
        .expect("data directory exists");

    tokio::fs::write(
        dir.path().join(ITEMS_FILE),
        r#"{ "Boots": ["Iron Greaves"], "Trinkets": ["Thief's Trinket"] }"#,
    )
    .await
    .expect("rewrite items");

    // Editors and file systems may report several events; wait for a reload
    // that sees the new content.
    let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(vocabulary) = updates.recv().await {
            if vocabulary.match_class("Trinkets") == ValueMatch::Exact {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    assert!(reloaded, "vocabulary should reload after items.json changes");
    assert_eq!(manager.current().await.match_class("Trinkets"), ValueMatch::Exact);
}
