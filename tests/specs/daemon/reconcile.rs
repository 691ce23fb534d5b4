//! Reconciling the schedules document onto the runtime.

use crate::prelude::*;
use rota_core::ScheduleId;

#[tokio::test]
async fn configured_schedules_are_registered_at_startup() {
    let fx = test_daemon();
    write_document(
        fx.config.state_dir.as_path(),
        r#"[
            {"tasks": "movies", "interval": {"hours": 1}},
            {"tasks": ["tv", "music"], "schedule": {"hour": 3}}
        ]"#,
    );
    let mut fx = fx.restart();

    fx.daemon.apply_config().await.unwrap();

    let runtime = fx.daemon.reconciler().runtime();
    assert_eq!(runtime.job_count(), 2);
    assert!(runtime.is_running());
    assert!(runtime
        .job_ids()
        .contains(&ScheduleId::of(&interval_schedule("movies", 1.0))));

    runtime.stop(true).await;
}

#[tokio::test]
async fn reapplying_the_same_document_changes_nothing() {
    let mut fx = test_daemon();
    fx.daemon
        .service()
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap();

    let runtime = std::sync::Arc::clone(fx.daemon.reconciler().runtime());
    let id = ScheduleId::of(&interval_schedule("movies", 1.0));
    let armed = runtime.next_run_time(&id);

    fx.daemon.apply_config().await.unwrap();

    assert_eq!(runtime.next_run_time(&id), armed);
    assert_eq!(runtime.job_count(), 1);
    runtime.stop(true).await;
}

#[tokio::test]
async fn disabling_schedules_empties_the_store_and_stops_the_runtime() {
    let fx = test_daemon();
    fx.daemon
        .service()
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap();
    fx.daemon.reconciler().runtime().stop(true).await;

    write_document(fx.config.state_dir.as_path(), "false");
    let mut fx = fx.restart();
    fx.daemon.apply_config().await.unwrap();

    let runtime = fx.daemon.reconciler().runtime();
    assert_eq!(runtime.job_count(), 0);
    assert!(!runtime.is_running());
}

#[tokio::test]
async fn absent_document_installs_the_hourly_catch_all() {
    let mut fx = test_daemon();
    fx.daemon.apply_config().await.unwrap();

    let runtime = fx.daemon.reconciler().runtime();
    assert_eq!(runtime.job_count(), 1);
    let views = fx.daemon.service().list().await;
    assert_eq!(views[0].config.tasks.names(), vec!["*".to_string()]);
    assert_eq!(
        views[0].next_run_time,
        Some(t0() + chrono::Duration::hours(1))
    );

    runtime.stop(true).await;
}
