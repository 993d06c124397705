//! Waiting for the source and index to come up before syncing

mod common;

use common::*;
use searchsync::core::backoff::ExponentialBackoff;
use searchsync::domain::SyncError;
use std::time::Duration;
use tokio::sync::watch;

fn quick_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(Duration::from_millis(1), Duration::from_millis(4), 2.0)
}

#[tokio::test]
async fn test_source_down_at_startup_is_retried() {
    let harness = Harness::new();
    harness.source.fail_next_connects(4);
    let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let reachable = harness
        .components()
        .wait_until_reachable(false, quick_backoff(), &mut shutdown_rx)
        .await
        .unwrap();

    assert!(reachable);
    assert_eq!(harness.source.connects(), 5);
}

#[tokio::test]
async fn test_index_coming_up_later_is_waited_for() {
    let harness = Harness::new();
    harness.index.set_down(true);
    let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let components = harness.components();
    let index = harness.index.clone();
    let waiter = tokio::spawn(async move {
        components
            .wait_until_reachable(false, quick_backoff(), &mut shutdown_rx)
            .await
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!waiter.is_finished());
    index.set_down(false);

    let reachable = tokio::time::timeout(Duration::from_secs(10), waiter)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(reachable);
}

#[tokio::test]
async fn test_shutdown_while_waiting_returns_not_reachable() {
    let harness = Harness::new();
    harness.source.fail_next_connects(usize::MAX);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let components = harness.components();
    let waiter = tokio::spawn(async move {
        components
            .wait_until_reachable(false, quick_backoff(), &mut shutdown_rx)
            .await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown_tx.send(true).unwrap();

    let reachable = tokio::time::timeout(Duration::from_secs(10), waiter)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(!reachable);
    assert!(harness.source.connects() >= 1);
}

#[tokio::test]
async fn test_rejected_credentials_fail_without_retrying() {
    let harness = Harness::new();
    harness.source.refuse_connects();
    let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let err = harness
        .components()
        .wait_until_reachable(false, quick_backoff(), &mut shutdown_rx)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Configuration(_)));
    assert_eq!(harness.source.connects(), 1);
}

#[tokio::test]
async fn test_dry_run_does_not_wait_for_index() {
    let harness = Harness::new();
    harness.index.set_down(true);
    let (_shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let reachable = harness
        .components()
        .wait_until_reachable(true, quick_backoff(), &mut shutdown_rx)
        .await
        .unwrap();

    assert!(reachable);
}
