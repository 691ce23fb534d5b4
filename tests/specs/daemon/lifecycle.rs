//! Daemon lifecycle: the full event loop from start to shutdown.

use crate::prelude::*;
use rota_core::LifecycleEvent;
use rota_daemon::Phase;

#[tokio::test]
async fn run_loop_applies_config_and_stops_on_request() {
    let fx = test_daemon();
    let TestDaemon {
        mut daemon, events, ..
    } = fx;

    let handle = tokio::spawn(async move {
        daemon.run().await.unwrap();
        daemon
    });

    events
        .send(LifecycleEvent::ShutdownRequested)
        .await
        .unwrap();
    let daemon = handle.await.unwrap();

    assert_eq!(daemon.phase(), Phase::Stopped);
    assert!(!daemon.reconciler().runtime().is_running());
    // The default schedule was installed before shutdown.
    assert_eq!(daemon.reconciler().runtime().job_count(), 1);
}

#[tokio::test]
async fn service_mutations_reach_a_running_loop() {
    let fx = test_daemon();
    let TestDaemon {
        mut daemon, events, ..
    } = fx;
    let service = std::sync::Arc::clone(daemon.service());
    let runtime = std::sync::Arc::clone(daemon.reconciler().runtime());

    let handle = tokio::spawn(async move {
        daemon.run().await.unwrap();
        daemon
    });

    service.create(interval_schedule("movies", 1.0)).await.unwrap();
    // Configuring a schedule displaces the default catch-all.
    assert_eq!(runtime.job_count(), 1);

    events
        .send(LifecycleEvent::ShutdownRequested)
        .await
        .unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn final_shutdown_terminates_a_graceful_one() {
    let fx = test_daemon();
    let TestDaemon {
        mut daemon, events, ..
    } = fx;

    let handle = tokio::spawn(async move {
        daemon.run().await.unwrap();
        daemon
    });

    events
        .send(LifecycleEvent::ShutdownRequested)
        .await
        .unwrap();
    events.send(LifecycleEvent::ShutdownFinal).await.unwrap();

    let daemon = handle.await.unwrap();
    assert_eq!(daemon.phase(), Phase::Stopped);
}
