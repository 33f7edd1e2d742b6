//! Integration tests for the guarded removal workflow.

mod common;

use std::time::{Duration, Instant};

use common::*;
use devsweep_core::{GuardedRemoval, RemovalOptions, RemovalState, RemovalTarget};

fn targets() -> Vec<RemovalTarget> {
    vec![
        RemovalTarget::new("dev-1", "LAPTOP-1"),
        RemovalTarget::new("dev-2", "LAPTOP-2"),
        RemovalTarget::new("dev-3", "LAPTOP-3"),
    ]
}

#[tokio::test]
async fn test_dry_run_makes_no_mutating_calls() {
    let directory = FakeDirectory::new();
    let options = RemovalOptions {
        dry_run: true,
        disable_first: true,
        delay: Duration::from_secs(5),
    };

    let started = Instant::now();
    let report = GuardedRemoval::new(&directory, options).run(&targets()).await;

    assert!(directory.calls().is_empty());
    assert_eq!(report.total(), 3);
    assert_eq!(report.planned, 3);
    assert!(report
        .items
        .iter()
        .all(|i| i.final_state() == RemovalState::WouldDelete));
    assert!(report.items[0].trail.contains(&RemovalState::WouldDisable));
    // Dry runs never throttle.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_delete_only_issues_one_call_per_device() {
    let directory = FakeDirectory::new();
    let report = GuardedRemoval::new(&directory, RemovalOptions::default())
        .run(&targets())
        .await;

    assert_eq!(
        directory.calls(),
        vec![
            Call::Delete("dev-1".into()),
            Call::Delete("dev-2".into()),
            Call::Delete("dev-3".into()),
        ]
    );
    assert_eq!(report.deleted, 3);
    assert!(!report.has_failures());
}

#[tokio::test]
async fn test_disable_failure_still_deletes() {
    let mut directory = FakeDirectory::new();
    directory.fail_update.insert("dev-1".into());
    let options = RemovalOptions {
        disable_first: true,
        ..Default::default()
    };

    let report = GuardedRemoval::new(&directory, options)
        .run(&[RemovalTarget::new("dev-1", "LAPTOP-1")])
        .await;

    let outcome = &report.items[0];
    assert_eq!(
        outcome.trail,
        vec![
            RemovalState::Pending,
            RemovalState::Disabling,
            RemovalState::DisableFailed,
            RemovalState::Deleting,
            RemovalState::Deleted,
        ]
    );
    assert!(outcome.disable_error.is_some());
    assert_eq!(report.deleted, 1);
    assert_eq!(report.disable_failed, 1);
    assert_eq!(
        directory.calls(),
        vec![
            Call::Update("dev-1".into(), Some(false)),
            Call::Delete("dev-1".into()),
        ]
    );
}

#[tokio::test]
async fn test_delete_failure_does_not_abort_batch() {
    let mut directory = FakeDirectory::new();
    directory.fail_delete.insert("dev-2".into());

    let report = GuardedRemoval::new(&directory, RemovalOptions::default())
        .run(&targets())
        .await;

    let finals: Vec<_> = report.items.iter().map(|i| i.final_state()).collect();
    assert_eq!(
        finals,
        vec![
            RemovalState::Deleted,
            RemovalState::DeleteFailed,
            RemovalState::Deleted
        ]
    );
    assert_eq!(report.delete_failed, 1);
    assert!(report.items[1]
        .error
        .as_deref()
        .unwrap()
        .contains("delete failed for dev-2"));
    // No retry of the failed delete.
    let deletes_for_dev2 = directory
        .calls()
        .into_iter()
        .filter(|c| *c == Call::Delete("dev-2".into()))
        .count();
    assert_eq!(deletes_for_dev2, 1);
}

#[tokio::test]
async fn test_rows_without_id_are_skipped() {
    let directory = FakeDirectory::new();
    let rows = vec![
        RemovalTarget {
            id: None,
            display_name: Some("GHOST".into()),
        },
        RemovalTarget {
            id: Some("   ".into()),
            display_name: None,
        },
        RemovalTarget::new("dev-9", "LAPTOP-9"),
    ];

    let report = GuardedRemoval::new(&directory, RemovalOptions::default())
        .run(&rows)
        .await;

    assert_eq!(report.skipped, 2);
    assert_eq!(report.items[0].trail, vec![RemovalState::Skipped]);
    assert_eq!(report.items[0].status_line(), "Skipped: GHOST - missing device id");
    assert_eq!(directory.mutating_calls(), vec![Call::Delete("dev-9".into())]);
}

#[tokio::test]
async fn test_delay_applies_between_devices() {
    let directory = FakeDirectory::new();
    let options = RemovalOptions {
        delay: Duration::from_millis(40),
        ..Default::default()
    };

    let started = Instant::now();
    let report = GuardedRemoval::new(&directory, options).run(&targets()).await;

    assert_eq!(report.deleted, 3);
    // Two gaps between three devices.
    assert!(started.elapsed() >= Duration::from_millis(80));
}
