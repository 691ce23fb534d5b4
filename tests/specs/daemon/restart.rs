//! Daemon restart: job identity and fire times survive.

use crate::prelude::*;
use rota_core::ScheduleId;

#[tokio::test]
async fn job_identity_is_stable_across_restarts() {
    let fx = test_daemon();
    write_document(
        fx.config.state_dir.as_path(),
        r#"[
            {"tasks": "movies", "interval": {"hours": 1}},
            {"tasks": "tv", "interval": {"hours": 2}}
        ]"#,
    );
    let mut fx = fx.restart();
    fx.daemon.apply_config().await.unwrap();

    let before_ids = fx.daemon.reconciler().runtime().job_ids();
    let movies = ScheduleId::of(&interval_schedule("movies", 1.0));
    let armed = fx.daemon.reconciler().runtime().next_run_time(&movies);
    fx.daemon.reconciler().runtime().stop(true).await;

    // Same document after restart: nothing is added, nothing removed,
    // and armed fire times come back from the job store untouched.
    let mut fx = fx.restart();
    fx.daemon.apply_config().await.unwrap();

    let runtime = fx.daemon.reconciler().runtime();
    assert_eq!(runtime.job_ids(), before_ids);
    assert_eq!(runtime.next_run_time(&movies), armed);
    runtime.stop(true).await;
}

#[tokio::test]
async fn edited_document_reconciles_after_restart() {
    let fx = test_daemon();
    write_document(
        fx.config.state_dir.as_path(),
        r#"[
            {"tasks": "movies", "interval": {"hours": 1}},
            {"tasks": "tv", "interval": {"hours": 2}}
        ]"#,
    );
    let mut fx = fx.restart();
    fx.daemon.apply_config().await.unwrap();
    fx.daemon.reconciler().runtime().stop(true).await;

    // The user edited the document while the daemon was down.
    write_document(
        fx.config.state_dir.as_path(),
        r#"[
            {"tasks": "tv", "interval": {"hours": 2}},
            {"tasks": "music", "interval": {"hours": 4}}
        ]"#,
    );
    let mut fx = fx.restart();
    fx.daemon.apply_config().await.unwrap();

    let runtime = fx.daemon.reconciler().runtime();
    let ids = runtime.job_ids();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&ScheduleId::of(&interval_schedule("movies", 1.0))));
    assert!(ids.contains(&ScheduleId::of(&interval_schedule("tv", 2.0))));
    assert!(ids.contains(&ScheduleId::of(&interval_schedule("music", 4.0))));
    runtime.stop(true).await;
}

#[tokio::test]
async fn fire_missed_during_downtime_runs_once_after_restart() {
    let fx = test_daemon();
    write_document(
        fx.config.state_dir.as_path(),
        r#"[{"tasks": "movies", "interval": {"hours": 1}}]"#,
    );
    let mut fx = fx.restart();
    fx.daemon.apply_config().await.unwrap();
    fx.daemon.reconciler().runtime().stop(true).await;

    // Downtime spans several periods but stays inside the grace window.
    let mut fx = fx.restart();
    fx.clock.set(t0() + chrono::Duration::hours(5));
    fx.daemon.apply_config().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(fx.engine.submissions(), vec![vec!["movies".to_string()]]);
    fx.daemon.reconciler().runtime().stop(true).await;
}
