//! Batch session lifecycle, expiry and the background sweeper.

use chrono::Utc;
use record_validation_engine::{BatchStatus, EngineError, SessionManager};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn session_finalizes_exactly_at_threshold() {
    let sessions = SessionManager::new();
    sessions.create_session("b1", Some(20.0)).await.unwrap();
    sessions.update_session("b1", 20, 80, 0).await.unwrap();

    assert_eq!(sessions.finalize_session("b1").await.unwrap(), BatchStatus::Success);
    // same totals, same verdict
    assert_eq!(sessions.finalize_session("b1").await.unwrap(), BatchStatus::Success);

    let status = sessions.get_status("b1").await.unwrap();
    assert!(status.is_final);
    assert_eq!(status.status, BatchStatus::Success);
    assert_eq!(status.total_records, 100);
    assert_eq!(status.success_rate, 20.0);
    assert_eq!(status.threshold, Some(20.0));
}

#[tokio::test]
async fn below_threshold_fails() {
    let sessions = SessionManager::new();
    sessions.create_session("b2", Some(20.0)).await.unwrap();
    sessions.update_session("b2", 19, 81, 0).await.unwrap();
    assert_eq!(sessions.finalize_session("b2").await.unwrap(), BatchStatus::Failed);
}

#[tokio::test]
async fn no_threshold_mirrors_single_versus_batch() {
    let sessions = SessionManager::new();

    sessions.create_session("one", None).await.unwrap();
    sessions.update_session("one", 0, 1, 0).await.unwrap();
    assert_eq!(sessions.finalize_session("one").await.unwrap(), BatchStatus::Failed);

    sessions.create_session("many", None).await.unwrap();
    sessions.update_session("many", 0, 1, 0).await.unwrap();
    sessions.update_session("many", 0, 1, 0).await.unwrap();
    assert_eq!(sessions.finalize_session("many").await.unwrap(), BatchStatus::Success);

    sessions.create_session("empty", None).await.unwrap();
    assert_eq!(sessions.finalize_session("empty").await.unwrap(), BatchStatus::Success);
}

#[tokio::test]
async fn updates_accumulate_and_track_warnings_separately() {
    let sessions = SessionManager::new();
    let created = sessions.create_session("acc", None).await.unwrap();
    assert_eq!(created.status, BatchStatus::InProgress);
    assert_eq!(created.total_records, 0);

    sessions.update_session("acc", 5, 1, 2).await.unwrap();
    let status = sessions.update_session("acc", 2, 2, 1).await.unwrap();

    assert_eq!(status.valid_records, 7);
    assert_eq!(status.invalid_records, 3);
    assert_eq!(status.total_records, 10);
    assert_eq!(status.warning_records, 3);
    assert_eq!(status.success_rate, 70.0);
    assert_eq!(status.status, BatchStatus::InProgress);
    assert!(status.last_updated >= status.started_at);
}

#[tokio::test]
async fn unknown_batch_ids_are_not_found() {
    let sessions = SessionManager::new();
    assert_eq!(
        sessions.update_session("ghost", 1, 0, 0).await.unwrap_err(),
        EngineError::SessionNotFound("ghost".to_string())
    );
    assert!(sessions.finalize_session("ghost").await.unwrap_err().is_not_found());
    assert!(sessions.get_status("ghost").await.unwrap_err().is_not_found());
    assert!(sessions.get_session("ghost").await.is_none());
    assert!(!sessions.delete_session("ghost").await);
}

#[tokio::test]
async fn duplicate_create_is_refused() {
    let sessions = SessionManager::new();
    sessions.create_session("dup", Some(50.0)).await.unwrap();
    sessions.update_session("dup", 1, 0, 0).await.unwrap();

    assert_eq!(
        sessions.create_session("dup", None).await.unwrap_err(),
        EngineError::SessionExists("dup".to_string())
    );
    let kept = sessions.get_session("dup").await.unwrap();
    assert_eq!(kept.valid_records, 1);
    assert_eq!(kept.threshold, Some(50.0));

    // get_or_create hands back the existing session untouched
    let same = sessions.get_or_create_session("dup", Some(99.0)).await;
    assert_eq!(same.threshold, Some(50.0));
    assert_eq!(same.valid_records, 1);
}

#[tokio::test]
async fn updates_after_finalize_do_not_change_the_verdict() {
    let sessions = SessionManager::new();
    sessions.create_session("done", Some(50.0)).await.unwrap();
    sessions.update_session("done", 1, 0, 0).await.unwrap();
    assert_eq!(sessions.finalize_session("done").await.unwrap(), BatchStatus::Success);

    let after = sessions.update_session("done", 0, 100, 0).await.unwrap();
    assert!(after.is_final);
    assert_eq!(after.invalid_records, 0);
    assert_eq!(after.status, BatchStatus::Success);
    assert_eq!(sessions.finalize_session("done").await.unwrap(), BatchStatus::Success);
}

#[tokio::test]
async fn delete_removes_the_session() {
    let sessions = SessionManager::new();
    sessions.create_session("gone", None).await.unwrap();
    assert!(sessions.delete_session("gone").await);
    assert!(sessions.get_session("gone").await.is_none());
    assert!(sessions.is_empty().await);
}

#[tokio::test]
async fn idle_sessions_expire() {
    let sessions = SessionManager::new();
    sessions.create_session("old", None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let cutoff = Utc::now();
    sessions.create_session("fresh", None).await.unwrap();

    assert_eq!(sessions.cleanup_idle_since(cutoff).await, 1);
    assert!(sessions.get_session("old").await.is_none());
    assert!(sessions.get_session("fresh").await.is_some());

    // nothing is idle for 30 minutes yet
    assert_eq!(sessions.cleanup_expired().await, 0);
    assert_eq!(sessions.len().await, 1);
}

#[tokio::test]
async fn an_update_keeps_a_session_alive() {
    let sessions = SessionManager::with_timing(Duration::from_millis(50), Duration::from_secs(60));
    sessions.create_session("busy", None).await.unwrap();
    sessions.create_session("idle", None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;
    sessions.update_session("busy", 1, 0, 0).await.unwrap();

    assert_eq!(sessions.cleanup_expired().await, 1);
    assert!(sessions.get_session("busy").await.is_some());
    assert!(sessions.get_session("idle").await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sweeper_expires_sessions_and_stops_on_shutdown() {
    let sessions = Arc::new(SessionManager::with_timing(
        Duration::from_millis(10),
        Duration::from_millis(25),
    ));
    sessions.create_session("short-lived", None).await.unwrap();

    let handle = sessions.clone().start_expiry_sweeper();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(sessions.is_empty().await);

    sessions.shutdown();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("sweeper did not stop")
        .expect("sweeper panicked");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_stops_every_sweeper() {
    let sessions = Arc::new(SessionManager::with_timing(
        Duration::from_secs(60),
        Duration::from_secs(60),
    ));
    let first = sessions.clone().start_expiry_sweeper();
    let second = sessions.clone().start_expiry_sweeper();

    sessions.shutdown();
    assert!(sessions.is_shut_down());
    for handle in [first, second] {
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .expect("sweeper panicked");
    }

    // a sweeper started after shutdown exits right away
    let late = sessions.clone().start_expiry_sweeper();
    tokio::time::timeout(Duration::from_secs(2), late)
        .await
        .expect("late sweeper did not stop")
        .expect("sweeper panicked");
}

#[tokio::test]
async fn overflowing_update_is_refused_and_changes_nothing() {
    let sessions = SessionManager::new();
    sessions.create_session("huge", None).await.unwrap();
    sessions.update_session("huge", 3, 1, 2).await.unwrap();

    let err = sessions
        .update_session("huge", u64::MAX, 1, 0)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::CountOverflow("huge".to_string()));

    let status = sessions.get_status("huge").await.unwrap();
    assert_eq!(status.valid_records, 3);
    assert_eq!(status.invalid_records, 1);
    assert_eq!(status.warning_records, 2);
    assert_eq!(status.total_records, 4);
    assert_eq!(sessions.finalize_session("huge").await.unwrap(), BatchStatus::Success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_are_not_lost() {
    let sessions = Arc::new(SessionManager::new());
    sessions.create_session("hot", None).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let sessions = sessions.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..10 {
                sessions.update_session("hot", 1, 1, 1).await.unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let status = sessions.get_status("hot").await.unwrap();
    assert_eq!(status.valid_records, 320);
    assert_eq!(status.invalid_records, 320);
    assert_eq!(status.total_records, 640);
    assert_eq!(status.warning_records, 320);
}
