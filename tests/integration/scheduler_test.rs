//! Scheduler resilience and loop control

use crate::common::*;
use nfo_watch::scheduler::{PipelineError, PollingScheduler, SchedulerState};
use nfo_watch::snapshot::StatusStore;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

fn qualifying_universe() -> Vec<nfo_watch::catalog::Instrument> {
    let mut universe = vec![future("FOO25OCTFUT", "FOO")];
    universe.extend(chain("FOO", "25OCT", &[100]));
    universe
}

fn qualifying_quotes() -> FakeQuotes {
    FakeQuotes::with(HashMap::from([
        ("FOO25OCTFUT".to_string(), quote(dec!(99), dec!(100))),
        ("FOO25OCT100CE".to_string(), quote(dec!(1), dec!(4))),
    ]))
}

#[tokio::test]
async fn test_catalog_failure_leaves_snapshot_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(qualifying_universe()),
        qualifying_quotes(),
    );
    let mut pipeline = harness.pipeline(config.clone(), FakeSpot::default());

    pipeline.run_cycle(at(2025, 10, 14)).await.unwrap();
    let snapshot_before = std::fs::read_to_string(config.storage.snapshot_path()).unwrap();
    let status_before = std::fs::read_to_string(config.storage.status_path()).unwrap();
    let previous_before = pipeline.previous_snapshot().clone();

    harness.catalog.fail.store(true, Ordering::SeqCst);
    let err = pipeline.run_cycle(at(2025, 10, 15)).await.unwrap_err();
    assert!(matches!(err, PipelineError::Catalog(_)));

    assert_eq!(std::fs::read_to_string(config.storage.snapshot_path()).unwrap(), snapshot_before);
    assert_eq!(std::fs::read_to_string(config.storage.status_path()).unwrap(), status_before);
    assert_eq!(pipeline.previous_snapshot(), &previous_before);
    assert_eq!(pipeline.last_status().and_then(|s| s.added_count), Some(1));
}

#[tokio::test]
async fn test_failure_before_any_success_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let catalog = FakeCatalog::with(qualifying_universe());
    catalog.fail.store(true, Ordering::SeqCst);
    let harness = Harness::new(FakeSession::default(), catalog, qualifying_quotes());
    let mut pipeline = harness.pipeline(config.clone(), FakeSpot::default());

    assert!(pipeline.run_cycle(at(2025, 10, 14)).await.is_err());
    assert_eq!(StatusStore::new(config.storage.status_path()).load(), None);
    assert!(!config.storage.snapshot_path().exists());
    assert!(harness.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_auth_failure_abandons_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let session = FakeSession::default();
    session.fail.store(true, Ordering::SeqCst);
    let harness = Harness::new(
        session,
        FakeCatalog::with(qualifying_universe()),
        qualifying_quotes(),
    );
    let mut scheduler = PollingScheduler::new(harness.pipeline(test_config(dir.path()), FakeSpot::default()));

    let err = scheduler.run_once().await.unwrap_err();
    assert!(matches!(err, PipelineError::Auth(_)));

    let status = scheduler.status();
    assert_eq!(status.state, SchedulerState::Idle);
    assert_eq!(status.cycles_abandoned, 1);
    assert_eq!(status.cycles_completed, 0);
    assert!(status.last_error.unwrap().contains("token expired"));
}

#[tokio::test]
async fn test_cancel_during_cycle_finishes_cycle_then_stops() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.scheduler.interval_seconds = 0;

    let cancel = CancellationToken::new();
    let session = FakeSession {
        cancel_after: Some((3, cancel.clone())),
        ..Default::default()
    };
    let harness = Harness::new(
        session,
        FakeCatalog::with(qualifying_universe()),
        qualifying_quotes(),
    );
    let mut scheduler = PollingScheduler::new(harness.pipeline(config, FakeSpot::default()));
    let status = scheduler.subscribe();

    scheduler.run(cancel).await;

    let last = status.borrow().clone();
    assert_eq!(last.state, SchedulerState::Terminated);
    assert_eq!(last.cycles_completed, 3);
    assert_eq!(harness.session.calls.load(Ordering::SeqCst), 3);
    // Only the first cycle added FOO
    assert_eq!(harness.notifier.sent().len(), 1);
    assert_eq!(last.watch_status.and_then(|s| s.added_count), Some(0));
}

#[tokio::test]
async fn test_loop_keeps_polling_after_abandoned_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.scheduler.interval_seconds = 0;

    let cancel = CancellationToken::new();
    let session = FakeSession {
        cancel_after: Some((2, cancel.clone())),
        ..Default::default()
    };
    session.fail.store(true, Ordering::SeqCst);
    let harness = Harness::new(
        session,
        FakeCatalog::with(qualifying_universe()),
        qualifying_quotes(),
    );
    let mut scheduler = PollingScheduler::new(harness.pipeline(config.clone(), FakeSpot::default()));

    scheduler.run(cancel).await;

    let last = scheduler.status();
    assert_eq!(last.state, SchedulerState::Terminated);
    assert_eq!(last.cycles_abandoned, 2);
    assert_eq!(last.cycles_completed, 0);
    assert!(last.last_error.unwrap().contains("token expired"));
    assert_eq!(harness.session.calls.load(Ordering::SeqCst), 2);
    assert!(!config.storage.snapshot_path().exists());
}

#[tokio::test]
async fn test_cancelled_before_start_runs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(qualifying_universe()),
        qualifying_quotes(),
    );
    let mut scheduler = PollingScheduler::new(harness.pipeline(test_config(dir.path()), FakeSpot::default()));

    let cancel = CancellationToken::new();
    cancel.cancel();
    scheduler.run(cancel).await;

    assert_eq!(scheduler.status().state, SchedulerState::Terminated);
    assert_eq!(harness.session.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sleep_wait_is_cancellable() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.scheduler.interval_seconds = 3600;
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(qualifying_universe()),
        qualifying_quotes(),
    );
    let mut scheduler = PollingScheduler::new(harness.pipeline(config, FakeSpot::default()));
    let mut status = scheduler.subscribe();

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        status
            .wait_for(|s| s.state == SchedulerState::Sleeping)
            .await
            .unwrap();
        stopper.cancel();
    });

    scheduler.run(cancel).await;
    let last = scheduler.status();
    assert_eq!(last.state, SchedulerState::Terminated);
    assert_eq!(last.cycles_completed, 1);
}
