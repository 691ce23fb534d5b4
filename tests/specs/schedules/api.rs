//! Schedule management API, end to end against a live daemon.

use crate::prelude::*;
use rota_core::schedule::{SchedulesConfig, TaskSelector};
use rota_core::ScheduleId;
use rota_daemon::{ApiError, ScheduleUpdate};

fn persisted(fx: &TestDaemon) -> SchedulesConfig {
    let raw = std::fs::read_to_string(fx.config.schedules_path.as_path()).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn crud_round_trip_keeps_disk_runtime_and_views_in_step() {
    let fx = test_daemon();
    let service = fx.daemon.service();
    let runtime = fx.daemon.reconciler().runtime();

    // Create
    let movies = service.create(interval_schedule("movies", 1.0)).await.unwrap();
    assert_eq!(movies.next_run_time, Some(t0() + chrono::Duration::hours(1)));
    assert_eq!(runtime.job_count(), 1);
    assert_eq!(
        persisted(&fx),
        SchedulesConfig::List(vec![interval_schedule("movies", 1.0)])
    );

    // Read
    assert_eq!(service.get(&movies.id).await.unwrap(), movies);
    assert_eq!(service.list().await, vec![movies.clone()]);

    // Update
    let edit = ScheduleUpdate {
        tasks: Some(TaskSelector::One("tv".to_string())),
        ..ScheduleUpdate::default()
    };
    let tv = service.update(&movies.id, &edit).await.unwrap();
    assert_ne!(tv.id, movies.id);
    assert!(runtime.job_ids().contains(&tv.id));
    assert!(!runtime.job_ids().contains(&movies.id));

    // Delete
    service.delete(&tv.id).await.unwrap();
    assert_eq!(runtime.job_count(), 0);
    assert_eq!(persisted(&fx), SchedulesConfig::List(Vec::new()));

    runtime.stop(true).await;
}

#[tokio::test]
async fn cron_schedule_views_expose_the_armed_fire_time() {
    let fx = test_daemon();
    let view = fx
        .daemon
        .service()
        .create(cron_schedule("movies", serde_json::json!({"hour": 15})))
        .await
        .unwrap();

    // t0 is 12:00 UTC, so `hour: 15` arms for the same afternoon.
    assert_eq!(view.next_run_time, Some(t0() + chrono::Duration::hours(3)));
    fx.daemon.reconciler().runtime().stop(true).await;
}

#[tokio::test]
async fn identical_schedule_cannot_be_created_twice() {
    let fx = test_daemon();
    let service = fx.daemon.service();
    service.create(interval_schedule("movies", 1.0)).await.unwrap();

    let err = service
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Duplicate(_)));
    fx.daemon.reconciler().runtime().stop(true).await;
}

#[tokio::test]
async fn ids_are_content_hashes() {
    let fx = test_daemon();
    let view = fx
        .daemon
        .service()
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap();

    // The id is derivable from content alone, independent of daemon state.
    assert_eq!(view.id, ScheduleId::of(&interval_schedule("movies", 1.0)));
    assert_eq!(view.id.as_str().len(), 64);
    fx.daemon.reconciler().runtime().stop(true).await;
}
