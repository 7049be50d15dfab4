//! Contract Test: Run Loop & Shutdown Determinism
//!
//! The run loop resolves the zone once, alternates passes with
//! repeat-interval sleeps through the injected sleeper, stops cleanly on
//! the shutdown signal, and terminates with an error on the first fatal
//! failure. Zone resolution failures are configuration errors surfaced
//! before any pass runs.

mod common;

use common::*;
use hddns_core::{Reconciler, ReconcilerEvent};
use std::time::Duration;

#[tokio::test]
async fn loop_runs_one_pass_then_sleeps_until_shutdown() {
    let provider = FakeDnsProvider::new(test_zone());
    let source = StaticAddressSource::new(
        Some("1.2.3.4".parse().unwrap()),
        Some("2001:db8::1".parse().unwrap()),
    );
    let sleeper = RecordingSleeper::blocking();

    let (reconciler, mut event_rx) = Reconciler::new(
        Box::new(provider.clone()),
        Box::new(source),
        Box::new(sleeper.clone()),
        test_config(),
    )
    .expect("reconciler construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle =
        tokio::spawn(async move { reconciler.run_with_shutdown(Some(shutdown_rx)).await });

    // Give the loop time to finish its first pass and park in the sleep
    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().expect("clean shutdown");

    // Exactly one pass: both records created once, one repeat sleep entered
    assert_eq!(provider.created().len(), 2);
    assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(3600)]);

    // Events: started, two creates, stopped
    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    assert!(matches!(events.first(), Some(ReconcilerEvent::Started { .. })));
    assert!(matches!(events.last(), Some(ReconcilerEvent::Stopped { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, ReconcilerEvent::RecordCreated { .. }))
            .count(),
        2
    );
}

#[tokio::test]
async fn fatal_pass_error_terminates_the_loop() {
    let provider = FakeDnsProvider::new(test_zone());
    provider.fail_creates();
    let source = StaticAddressSource::new(
        Some("1.2.3.4".parse().unwrap()),
        Some("2001:db8::1".parse().unwrap()),
    );

    let (reconciler, _event_rx) = Reconciler::new(
        Box::new(provider),
        Box::new(source),
        Box::new(RecordingSleeper::blocking()),
        test_config(),
    )
    .expect("reconciler construction succeeds");

    // No shutdown signal needed: the first pass fails and the loop exits
    let err = reconciler
        .run_with_shutdown(None)
        .await
        .expect_err("provider failure must be fatal");
    assert!(matches!(err, hddns_core::Error::Provider { .. }));
}

#[tokio::test]
async fn unknown_zone_is_a_configuration_error() {
    let provider = FakeDnsProvider::new(test_zone());
    let source = StaticAddressSource::new(Some("1.2.3.4".parse().unwrap()), None);

    let mut config = test_config();
    config.zone = "missing.example".to_string();
    config.disable_v6 = true;

    let (reconciler, _event_rx) = Reconciler::new(
        Box::new(provider.clone()),
        Box::new(source.clone()),
        Box::new(RecordingSleeper::blocking()),
        config,
    )
    .expect("reconciler construction succeeds");

    let err = reconciler
        .run_with_shutdown(None)
        .await
        .expect_err("unknown zone must be fatal at startup");
    assert!(matches!(err, hddns_core::Error::Config(_)));

    // Nothing was observed or reconciled
    assert!(source.observed().is_empty());
    assert_eq!(provider.mutation_count(), 0);
}

#[tokio::test]
async fn find_zone_resolves_by_name() {
    let provider = FakeDnsProvider::new(test_zone());
    let source = StaticAddressSource::new(Some("1.2.3.4".parse().unwrap()), None);

    let mut config = test_config();
    config.disable_v6 = true;

    let (reconciler, _event_rx) = Reconciler::new(
        Box::new(provider),
        Box::new(source),
        Box::new(RecordingSleeper::new()),
        config,
    )
    .expect("reconciler construction succeeds");

    let zone = reconciler.find_zone().await.unwrap();
    assert_eq!(zone.id, "zone-1");
    assert_eq!(zone.name, "example.com");
}
