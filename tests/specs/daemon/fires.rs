//! Fire behavior: due jobs run, misses coalesce, stale fires drop.

use crate::prelude::*;
use chrono::Duration;
use rota_core::ScheduleId;

async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
}

#[tokio::test]
async fn due_schedule_submits_its_tasks() {
    let fx = test_daemon();
    fx.daemon
        .service()
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap();

    fx.clock.advance(Duration::minutes(61));
    fx.daemon.reconciler().runtime().wake();
    settle().await;

    assert_eq!(fx.engine.submissions(), vec![vec!["movies".to_string()]]);
    fx.daemon.reconciler().runtime().stop(true).await;
}

#[tokio::test]
async fn missed_periods_coalesce_into_one_catch_up_fire() {
    let fx = test_daemon();
    fx.daemon
        .service()
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap();

    fx.clock.advance(Duration::hours(6));
    fx.daemon.reconciler().runtime().wake();
    settle().await;

    assert_eq!(fx.engine.submissions().len(), 1);
    fx.daemon.reconciler().runtime().stop(true).await;
}

#[tokio::test]
async fn fire_staler_than_the_grace_window_is_dropped() {
    let fx = test_daemon();
    fx.daemon
        .service()
        .create(interval_schedule("movies", 1.0))
        .await
        .unwrap();
    let id = ScheduleId::of(&interval_schedule("movies", 1.0));

    // The armed fire at t0+1h is now 47 hours stale.
    fx.clock.advance(Duration::hours(48));
    fx.daemon.reconciler().runtime().wake();
    settle().await;

    assert!(fx.engine.submissions().is_empty());
    // Dropped, not forgotten: the schedule is re-armed for the future.
    assert_eq!(
        fx.daemon.reconciler().runtime().next_run_time(&id),
        Some(t0() + Duration::hours(48) + Duration::hours(1))
    );
    fx.daemon.reconciler().runtime().stop(true).await;
}

#[tokio::test]
async fn default_schedule_fires_the_wildcard_selector() {
    let mut fx = test_daemon();
    fx.daemon.apply_config().await.unwrap();

    fx.clock.advance(Duration::minutes(61));
    fx.daemon.reconciler().runtime().wake();
    settle().await;

    assert_eq!(fx.engine.submissions(), vec![vec!["*".to_string()]]);
    fx.daemon.reconciler().runtime().stop(true).await;
}
