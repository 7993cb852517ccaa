//! Advisory lock behaviour: exclusion, timeouts and release guarantees

use chosen_fs::lock::marker_path;
use chosen_fs::{Error, ErrorKind, LockManager};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tempfile::tempdir;

#[tokio::test]
async fn test_acquire_creates_empty_marker_and_release_removes_it() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::new();

    let lock = manager.acquire(&target, Duration::from_secs(1)).await.unwrap();

    assert_eq!(lock.path(), target);
    assert_eq!(lock.lock_file(), dir.path().join(".f.txt.lock"));
    assert_eq!(std::fs::metadata(lock.lock_file()).unwrap().len(), 0);
    assert!(manager.is_locked(&target));
    assert!(!target.exists(), "locking must not create the target");

    manager.release(&lock).await;

    assert!(!lock.lock_file().exists());
    assert!(!manager.is_locked(&target));
}

#[tokio::test]
async fn test_second_acquire_times_out_until_release() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::new();

    let first = manager.acquire(&target, Duration::from_secs(5)).await.unwrap();

    let err = manager
        .acquire(&target, Duration::from_millis(100))
        .await
        .unwrap_err();
    match &err {
        Error::LockTimeout {
            path,
            lock_file,
            timeout,
            lock_file_exists,
        } => {
            assert_eq!(path, &target);
            assert_eq!(lock_file, &marker_path(&target));
            assert_eq!(*timeout, Duration::from_millis(100));
            assert!(*lock_file_exists);
        }
        other => panic!("expected LockTimeout, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::LockTimeout);

    manager.release(&first).await;

    let third = manager.acquire(&target, Duration::from_millis(100)).await.unwrap();
    manager.release(&third).await;
}

#[tokio::test]
async fn test_zero_timeout_fails_on_first_attempt() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::with_poll_interval(Duration::from_secs(1));
    let held = manager.acquire(&target, Duration::ZERO).await.unwrap();

    let started = Instant::now();
    let err = manager.acquire(&target, Duration::ZERO).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, Error::LockTimeout { timeout, .. } if timeout == Duration::ZERO));
    assert!(elapsed < Duration::from_millis(500), "waited {elapsed:?}");
    assert_eq!(err.details()["timeout"], 0.0);

    manager.release(&held).await;
}

#[tokio::test]
async fn test_release_is_idempotent() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::new();
    let lock = manager.acquire(&target, Duration::ZERO).await.unwrap();

    manager.release(&lock).await;
    manager.release(&lock).await;
    manager.release_blocking(&lock);

    assert!(manager.active_locks().is_empty());
}

#[tokio::test]
async fn test_release_tolerates_marker_removed_externally() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::new();
    let lock = manager.acquire(&target, Duration::ZERO).await.unwrap();

    std::fs::remove_file(lock.lock_file()).unwrap();
    manager.release(&lock).await;

    assert!(!manager.is_locked(&target));
}

#[tokio::test]
async fn test_marker_from_another_holder_blocks_new_manager() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let one = LockManager::new();
    let other = LockManager::new();

    let held = one.acquire(&target, Duration::ZERO).await.unwrap();

    let err = other
        .acquire(&target, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LockTimeout);
    assert!(!other.is_locked(&target));

    one.release(&held).await;
    let acquired = other.acquire(&target, Duration::ZERO).await.unwrap();
    other.release(&acquired).await;
}

#[tokio::test]
async fn test_orphaned_marker_blocks_until_removed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    std::fs::write(marker_path(&target), "").unwrap();
    let manager = LockManager::new();

    let err = manager
        .acquire(&target, Duration::from_millis(30))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::LockTimeout {
            lock_file_exists: true,
            ..
        }
    ));

    std::fs::remove_file(marker_path(&target)).unwrap();
    let lock = manager.acquire(&target, Duration::ZERO).await.unwrap();
    manager.release(&lock).await;
}

#[tokio::test]
async fn test_acquire_creates_missing_parent_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("conversations/new.yaml");
    let manager = LockManager::new();

    let lock = manager.acquire(&target, Duration::ZERO).await.unwrap();

    assert!(lock.lock_file().exists());
    manager.release(&lock).await;
}

#[tokio::test]
async fn test_parent_that_is_a_file_fails_without_waiting() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("x");
    std::fs::write(&blocker, "not a directory").unwrap();
    let manager = LockManager::new();

    let started = Instant::now();
    let err = manager
        .acquire(blocker.join("f.txt"), Duration::from_secs(5))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    match &err {
        Error::Io {
            path, operation, ..
        } => {
            assert_eq!(path, &blocker);
            assert_eq!(*operation, "creating lock directory");
        }
        other => panic!("expected Io error, got {other:?}"),
    }
    assert!(elapsed < Duration::from_secs(1), "retried for {elapsed:?}");
    assert!(manager.active_locks().is_empty());
}

#[tokio::test]
async fn test_release_through_another_manager_removes_marker() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let acquirer = LockManager::new();
    let releaser = LockManager::new();
    let lock = acquirer.acquire(&target, Duration::ZERO).await.unwrap();

    releaser.release(&lock).await;

    assert!(!lock.lock_file().exists());
    let again = releaser.acquire(&target, Duration::ZERO).await.unwrap();
    releaser.release(&again).await;
    assert!(!marker_path(&target).exists());
}

#[tokio::test]
async fn test_guard_releases_on_drop() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::new();

    {
        let guard = manager.with_lock(&target, Duration::ZERO).await.unwrap();
        assert!(guard.lock_file().exists());
    }

    assert!(!manager.is_locked(&target));
    assert!(!marker_path(&target).exists());
}

#[tokio::test]
async fn test_run_locked_releases_on_error() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = LockManager::new();

    let result: Result<(), Error> = manager
        .run_locked(&target, Duration::ZERO, || async {
            Err(Error::NotEmpty {
                path: "somewhere".into(),
            })
        })
        .await;

    assert!(matches!(result, Err(Error::NotEmpty { .. })));
    assert!(!manager.is_locked(&target));
    assert!(!marker_path(&target).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_guard_releases_when_task_panics() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("f.txt");
    let manager = Arc::new(LockManager::new());

    let task_manager = Arc::clone(&manager);
    let task_target = target.clone();
    let outcome = tokio::spawn(async move {
        let _guard = task_manager
            .with_lock(&task_target, Duration::ZERO)
            .await
            .unwrap();
        panic!("critical section failed");
    })
    .await;

    assert!(outcome.unwrap_err().is_panic());
    assert!(!manager.is_locked(&target));
    let lock = manager.acquire(&target, Duration::ZERO).await.unwrap();
    manager.release(&lock).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_holders_are_mutually_exclusive() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("counter.txt");
    let manager = Arc::new(LockManager::with_poll_interval(Duration::from_millis(2)));
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        let target = target.clone();
        let inside = Arc::clone(&inside);
        let max_inside = Arc::clone(&max_inside);
        tasks.push(tokio::spawn(async move {
            let guard = manager
                .with_lock(&target, Duration::from_secs(10))
                .await
                .unwrap();
            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
            max_inside.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            inside.fetch_sub(1, Ordering::SeqCst);
            guard.release().await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert!(manager.active_locks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_read_modify_write_under_lock_loses_no_updates() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("count.txt");
    std::fs::write(&target, "0").unwrap();
    let manager = Arc::new(LockManager::new());
    let files = chosen_fs::FileHandler::new();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let manager = Arc::clone(&manager);
        let target = target.clone();
        tasks.push(tokio::spawn(async move {
            manager
                .run_locked(&target, Duration::from_secs(10), || async {
                    let current: u32 = files.read_text(&target).await?.parse().unwrap();
                    files.write_text(&target, (current + 1).to_string()).await
                })
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "10");
}
