//! End-to-end scenarios across the file, lock and YAML layers.

use assert_fs::prelude::*;
use chosen_fs::{Error as FsError, FileHandler, LockManager, validate_pattern};
use chosen_store::{Record, YamlStore};
use predicates::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Contact {
    name: String,
}

impl Record for Contact {
    const TYPE_NAME: &'static str = "Contact";
    const REQUIRED_FIELDS: &'static [&'static str] = &["name"];
}

#[tokio::test]
async fn test_write_read_delete_then_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    let files = FileHandler::new();
    let path = temp.child("f.txt");

    files.write_text(path.path(), "Hello").await.unwrap();
    assert_eq!(files.read_text(path.path()).await.unwrap(), "Hello");
    assert!(files.delete_file(path.path()).await.unwrap());

    let err = files.read_text(path.path()).await.unwrap_err();
    assert!(matches!(err, FsError::NotFound { .. }), "{err:?}");
    path.assert(predicate::path::missing());
}

#[tokio::test]
async fn test_second_caller_times_out_until_first_releases() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = temp.child("f.txt");
    let locks = LockManager::new();

    let first = locks.acquire(path.path(), Duration::from_secs(5)).await.unwrap();
    temp.child(".f.txt.lock").assert(predicate::path::is_file());

    let err = locks
        .acquire(path.path(), Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, FsError::LockTimeout { .. }), "{err:?}");

    locks.release(&first).await;
    let third = locks
        .acquire(path.path(), Duration::from_millis(100))
        .await
        .unwrap();
    locks.release(&third).await;
    temp.child(".f.txt.lock").assert(predicate::path::missing());
}

#[tokio::test]
async fn test_zero_timeout_on_held_lock_fails_without_waiting() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = temp.child("f.txt");
    let locks = LockManager::new();
    let held = locks.acquire(path.path(), Duration::from_secs(1)).await.unwrap();

    let started = Instant::now();
    let err = locks.acquire(path.path(), Duration::ZERO).await.unwrap_err();

    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(err.details()["timeout"], serde_json::json!(0.0));
    locks.release(&held).await;
    locks.release(&held).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_managers_sharing_a_directory_exclude_each_other() {
    let temp = assert_fs::TempDir::new().unwrap();
    let counter = temp.child("counter.txt");
    counter.write_str("0").unwrap();
    let path = Arc::new(counter.path().to_path_buf());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let path = Arc::clone(&path);
        tasks.push(tokio::spawn(async move {
            // Separate managers only share the on-disk marker.
            let locks = LockManager::new();
            let files = FileHandler::new();
            let guard = locks
                .with_lock(path.as_path(), Duration::from_secs(10))
                .await
                .unwrap();
            let value: u32 = files.read_text(path.as_path()).await.unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
            files
                .write_text(path.as_path(), (value + 1).to_string())
                .await
                .unwrap();
            guard.release().await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    counter.assert("8");
}

#[tokio::test]
async fn test_record_with_multiline_name_survives_save_and_load() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = YamlStore::default();
    let path = temp.child("contacts/c1.yaml");

    store
        .save(&Contact { name: "line1\nline2".to_string() }, path.path())
        .await
        .unwrap();
    let loaded: Contact = store.load(path.path()).await.unwrap();

    assert_eq!(loaded.name, "line1\nline2");
    path.assert(predicate::str::contains("name: |-"));
}

#[tokio::test]
async fn test_listing_is_not_recursive_and_patterns_are_guarded() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("dir/a.txt").write_str("a").unwrap();
    temp.child("dir/sub/b.txt").write_str("b").unwrap();
    let files = FileHandler::new();

    let listed = files.list_directory(temp.child("dir").path(), "*").await.unwrap();
    let names: Vec<_> = listed
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "sub"]);

    for pattern in ["../*", "/etc/*", "C:\\*"] {
        assert!(
            matches!(validate_pattern(pattern), Err(FsError::InvalidPattern { .. })),
            "{pattern}"
        );
        assert!(files.list_directory(temp.child("dir").path(), pattern).await.is_err());
    }
    assert!(validate_pattern("*.txt").is_ok());
}
