//! Application-level flows: settings, repositories and on-disk layout.

use chosen_core::models::{Conversation, Message, Platform, ProcessStatus, UserSettings};
use chosen_core::{AppContext, SettingsLoader};
use chosen_store::{DEFAULT_LIST_LIMIT, Filters, Repository};
use chosen_test_utils::TestDataDir;
use std::time::Duration;

async fn open_from_toml(data: &TestDataDir, extra: &str) -> AppContext {
    let root = data.mkdir("store");
    data.write(
        "cwd/chosen.toml",
        &format!("data_dir = {:?}\n{extra}", root.display().to_string()),
    );
    let settings = SettingsLoader::new()
        .with_working_dir(data.child("cwd"))
        .with_global_config_dir(data.mkdir("global"))
        .load(None, [("CHOSEN_LOCK_POLL_INTERVAL_MS", "5")])
        .unwrap();
    AppContext::open(settings).await.unwrap()
}

#[tokio::test]
async fn test_conversation_lifecycle_on_disk() {
    let data = TestDataDir::new();
    let ctx = open_from_toml(&data, "").await;
    assert_eq!(ctx.locks().poll_interval(), Duration::from_millis(5));

    let mut conversation = Conversation::new(Platform::Linkedin, "田中太郎");
    conversation.company = Some("Acme".to_string());
    conversation.add_message(Message::new(
        "田中太郎",
        "Hello!\n\nI found your profile. Salary range is $150K.\n",
    ));
    let saved = ctx.conversations().save(conversation).await.unwrap();
    let file = format!("store/conversations/{}.yaml", saved.id);
    data.assert_file_exists(&file);

    let text = data.read(&file);
    assert!(text.contains("recruiter_name: 田中太郎"), "{text}");
    assert!(text.contains("context_analysis: null"), "{text}");

    // A hand edit is picked up on the next read.
    data.write(&file, &text.replace("process_status: new", "process_status: applied"));
    let reloaded = ctx.conversations().get(&saved.id).await.unwrap().unwrap();
    assert_eq!(reloaded.process_status, ProcessStatus::Applied);
    assert_eq!(reloaded.messages, saved.messages);

    ctx.conversations()
        .archive(&saved.id, Some("Not a fit".to_string()))
        .await
        .unwrap();
    let mut filters = Filters::new();
    filters.insert("archived".to_string(), serde_json::json!(false));
    assert!(ctx
        .conversations()
        .list(&filters, DEFAULT_LIST_LIMIT, 0)
        .await
        .unwrap()
        .is_empty());

    assert!(ctx.conversations().delete(&saved.id).await.unwrap());
    assert_eq!(ctx.conversations().get(&saved.id).await.unwrap(), None);
    assert!(data.entries("store/conversations").is_empty());
}

#[tokio::test]
async fn test_corrupt_document_surfaces_structured_error() {
    let data = TestDataDir::new();
    let ctx = open_from_toml(&data, "").await;
    data.write(
        "store/conversations/broken.yaml",
        "platform: email\nrecruiter_name: [Jane\n",
    );

    let err = ctx.conversations().get("broken").await.unwrap_err();

    assert_eq!(err.kind().as_str(), "YAML_PARSE_ERROR");
    let details = err.details();
    assert_eq!(details["model_type"], "Conversation");
    assert!(
        details["path"].as_str().unwrap().ends_with("broken.yaml"),
        "{details:?}"
    );
}

#[tokio::test]
async fn test_orphaned_marker_blocks_writers_until_removed() {
    let data = TestDataDir::new();
    let ctx = open_from_toml(&data, "lock_timeout_ms = 40\n").await;
    let saved = ctx
        .conversations()
        .save(Conversation::new(Platform::Phone, "Jane"))
        .await
        .unwrap();
    let marker = format!("store/conversations/.{}.yaml.lock", saved.id);
    data.write(&marker, "");

    let err = ctx
        .conversations()
        .update(&saved.id, |c| c.process_status = ProcessStatus::Ghosted)
        .await
        .unwrap_err();
    assert_eq!(err.kind().as_str(), "LOCK_TIMEOUT");
    assert_eq!(err.details()["lock_file_exists"], serde_json::json!(true));

    std::fs::remove_file(data.child(&marker)).unwrap();
    let updated = ctx
        .conversations()
        .update(&saved.id, |c| c.process_status = ProcessStatus::Ghosted)
        .await
        .unwrap();
    assert_eq!(updated.process_status, ProcessStatus::Ghosted);
}

#[tokio::test]
async fn test_user_settings_resume_path_is_confined_to_data_dir() {
    let data = TestDataDir::new();
    let ctx = open_from_toml(&data, "").await;

    let mut settings = UserSettings::new("Taro", "taro@example.com");
    settings.resume_path = Some("../outside.pdf".to_string());
    let err = ctx.user_settings().save(settings.clone()).await.unwrap_err();
    assert_eq!(err.kind().as_str(), "SCHEMA_VALIDATION_ERROR");
    data.assert_not_exists("store/settings/user.yaml");

    settings.resume_path = Some("resumes/taro.pdf".to_string());
    ctx.user_settings().save(settings.clone()).await.unwrap();
    assert_eq!(ctx.user_settings().load().await.unwrap(), Some(settings));
}
