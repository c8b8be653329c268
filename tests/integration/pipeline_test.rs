//! Full cycle tests against in-memory providers

use crate::common::*;
use nfo_watch::catalog::{Instrument, InstrumentKind};
use nfo_watch::cycle::ContractCycle;
use nfo_watch::provider::Quote;
use nfo_watch::snapshot::{SnapshotStore, StatusStore};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::Duration;

/// FOO has contracts for the next month only
fn fallback_universe() -> Vec<Instrument> {
    let mut universe = vec![
        Instrument::new("FOO25DEC100CE", "FOO", InstrumentKind::Call, dec!(100)),
        future("FOO26JANFUT", "FOO"),
    ];
    universe.extend(chain("FOO", "26JAN", &[80, 90, 100, 110, 120, 130]));
    universe
}

fn fallback_quotes() -> FakeQuotes {
    FakeQuotes::with(HashMap::from([
        ("FOO26JANFUT".to_string(), quote(dec!(100), dec!(101))),
        ("FOO26JAN100CE".to_string(), quote(dec!(2), dec!(7))),
        ("FOO26JAN130CE".to_string(), quote(dec!(1), dec!(9))),
        ("FOO25DEC100CE".to_string(), quote(dec!(1), dec!(10))),
    ]))
}

#[tokio::test]
async fn test_fallback_cycle_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(fallback_universe()),
        fallback_quotes(),
    );
    let mut pipeline = harness.pipeline(config.clone(), FakeSpot::default());

    let started_at = at(2025, 12, 15);
    let outcome = pipeline.run_cycle(started_at).await.unwrap();

    assert_eq!(outcome.cycle, ContractCycle::fallback("26JAN"));
    assert_eq!(outcome.futures, 1);
    // ATM from the future's last price (101) selects strikes 90, 100, 110
    assert_eq!(outcome.selected_options, 6);
    assert_eq!(outcome.atm_skipped, 0);
    assert_eq!(outcome.qualifying, 1);
    assert_eq!(outcome.added, vec!["FOO".to_string()]);
    assert!(outcome.removed.is_empty());

    let requests = harness.quotes.requests.lock().unwrap().clone();
    assert!(requests.iter().flatten().all(|s| s.contains("26JAN")));
    let scanned = requests.last().unwrap();
    assert_eq!(scanned.len(), 6);
    assert!(!scanned.contains(&"FOO26JAN130CE".to_string()));

    let snapshot = SnapshotStore::new(config.storage.snapshot_path()).load();
    assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["FOO"]);
    assert_eq!(pipeline.previous_snapshot(), &snapshot);

    let status = StatusStore::new(config.storage.status_path()).load().unwrap();
    assert_eq!(status.added_count, Some(1));
    assert_eq!(status.removed_count, Some(0));
    assert_eq!(status.interval_seconds, 60);
    assert_eq!(status.next_run_eta, started_at.timestamp() + 60);

    let diff_file = dir.path().join("options_up_diff_20251215_101500.txt");
    let diff_text = std::fs::read_to_string(diff_file).unwrap();
    assert!(diff_text.contains("Added scripts (1):\n  + FOO\n"));

    assert_eq!(
        harness.notifier.sent(),
        vec![(
            "Options Up 200% Changed".to_string(),
            "Added scripts: 1".to_string(),
            Duration::from_secs(5)
        )]
    );
}

#[tokio::test]
async fn test_removals_do_not_notify() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let mut universe = vec![future("FOO25OCTFUT", "FOO"), future("BAR25OCTFUT", "BAR")];
    universe.extend(chain("FOO", "25OCT", &[100]));
    universe.extend(chain("BAR", "25OCT", &[50]));

    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(universe),
        FakeQuotes::with(HashMap::from([
            ("FOO25OCT100CE".to_string(), quote(dec!(1), dec!(3))),
            ("BAR25OCT50PE".to_string(), quote(dec!(2), dec!(8))),
        ])),
    );
    let spot = FakeSpot {
        prices: HashMap::from([("FOO".to_string(), dec!(100)), ("BAR".to_string(), dec!(50))]),
    };
    let mut pipeline = harness.pipeline(config.clone(), spot);

    let first = pipeline.run_cycle(at(2025, 10, 14)).await.unwrap();
    assert_eq!(first.added, vec!["BAR".to_string(), "FOO".to_string()]);
    assert_eq!(harness.notifier.sent().len(), 1);

    // BAR falls back below the threshold
    harness.quotes.set("BAR25OCT50PE", quote(dec!(2), dec!(3)));
    let second = pipeline.run_cycle(at(2025, 10, 15)).await.unwrap();
    assert!(second.added.is_empty());
    assert_eq!(second.removed, vec!["BAR".to_string()]);
    assert_eq!(harness.notifier.sent().len(), 1);

    let snapshot = SnapshotStore::new(config.storage.snapshot_path()).load();
    assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["FOO"]);
    let status = StatusStore::new(config.storage.status_path()).load().unwrap();
    assert_eq!(status.added_count, Some(0));
    assert_eq!(status.removed_count, Some(1));
}

#[tokio::test]
async fn test_notify_always_reports_no_change() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.scheduler.notify_always = true;

    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(vec![future("FOO25OCTFUT", "FOO")]),
        FakeQuotes::default(),
    );
    let mut pipeline = harness.pipeline(config, FakeSpot::default());

    let outcome = pipeline.run_cycle(at(2025, 10, 14)).await.unwrap();
    assert_eq!(outcome.qualifying, 0);
    assert_eq!(
        harness.notifier.sent(),
        vec![(
            "Options Up 200% Watcher".to_string(),
            "No change since last run".to_string(),
            Duration::from_secs(4)
        )]
    );
}

#[tokio::test]
async fn test_notify_on_change_disabled_still_records_diff() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.scheduler.notify_on_change = false;

    let mut universe = vec![future("FOO25OCTFUT", "FOO")];
    universe.extend(chain("FOO", "25OCT", &[100]));
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with(universe),
        FakeQuotes::with(HashMap::from([
            ("FOO25OCTFUT".to_string(), quote(dec!(99), dec!(100))),
            ("FOO25OCT100CE".to_string(), quote(dec!(1), dec!(4))),
        ])),
    );
    let mut pipeline = harness.pipeline(config.clone(), FakeSpot::default());

    let outcome = pipeline.run_cycle(at(2025, 10, 14)).await.unwrap();
    assert_eq!(outcome.added, vec!["FOO".to_string()]);
    assert!(harness.notifier.sent().is_empty());

    let diff_file = dir.path().join("options_up_diff_20251014_101500.txt");
    let diff_text = std::fs::read_to_string(diff_file).unwrap();
    assert!(diff_text.contains("Added scripts (1):\n  + FOO\n"));

    let snapshot = SnapshotStore::new(config.storage.snapshot_path()).load();
    assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["FOO"]);
    let status = StatusStore::new(config.storage.status_path()).load().unwrap();
    assert_eq!(status.added_count, Some(1));
}

#[tokio::test]
async fn test_option_price_as_last_atm_source() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with({
            let mut universe = vec![future("FOO25OCTFUT", "FOO")];
            universe.extend(chain("FOO", "25OCT", &[80, 90, 100, 110, 120]));
            universe
        }),
        FakeQuotes::with(HashMap::from([(
            "FOO25OCT120CE".to_string(),
            Quote {
                open: Some(dec!(1)),
                last_price: Some(dec!(5)),
                ..Default::default()
            },
        )])),
    );
    let mut pipeline = harness.pipeline(config, FakeSpot::default());

    // Only a deep option has a price, so ATM comes from it
    let outcome = pipeline.run_cycle(at(2025, 10, 14)).await.unwrap();
    assert_eq!(outcome.atm_skipped, 0);
    assert_eq!(outcome.selected_options, 4);
    assert_eq!(outcome.qualifying, 0);
}

#[tokio::test]
async fn test_skipped_atm_keeps_every_option() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let harness = Harness::new(
        FakeSession::default(),
        FakeCatalog::with({
            let mut universe = vec![future("FOO25OCTFUT", "FOO")];
            universe.extend(chain("FOO", "25OCT", &[80, 90, 100, 110, 120]));
            universe
        }),
        FakeQuotes::default(),
    );
    let mut pipeline = harness.pipeline(config, FakeSpot::default());

    let outcome = pipeline.run_cycle(at(2025, 10, 14)).await.unwrap();
    assert_eq!(outcome.atm_skipped, 1);
    assert_eq!(outcome.selected_options, 10);
}

