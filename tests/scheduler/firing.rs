//! Live firing behavior on the shared executor.

use chrono::{Datelike, Weekday};
use edgekit_executor::ExecutorConfig;
use edgekit_scheduler::{Period, SchedulerConfig, TaskDescriptor, TaskRegistry};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn fast_descriptor(name: &str) -> TaskDescriptor {
    TaskDescriptor::builder(name)
        .cadence(Period::Every(Duration::from_millis(40)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn fires_repeat_until_cancel_all() {
    let executor = ExecutorConfig::builder().build();
    let scheduler = SchedulerConfig::builder(executor.clone()).build();

    let fired = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&fired);

    let mut registry = TaskRegistry::new();
    registry
        .register_fn(fast_descriptor("tick"), move || {
            let f = Arc::clone(&f);
            Box::pin(async move {
                f.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .unwrap();

    scheduler.start(&registry).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    scheduler.cancel_all();
    let at_cancel = fired.load(Ordering::SeqCst);
    assert!(at_cancel >= 2, "expected repeated fires, got {at_cancel}");

    // In-flight fires may complete, but nothing new starts.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let after = fired.load(Ordering::SeqCst);
    assert!(after <= at_cancel + 1, "fires continued after cancel");

    executor.shutdown().await;
}

#[tokio::test]
async fn off_calendar_days_skip_instead_of_running() {
    let executor = ExecutorConfig::builder().build();

    let skipped = Arc::new(AtomicUsize::new(0));
    let s = Arc::clone(&skipped);
    let scheduler = SchedulerConfig::builder(executor.clone())
        .on_task_skipped(move |_task| {
            s.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let ran = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ran);

    // Allow only a day that is never "today": the complement of today's weekday.
    let today = chrono::Utc::now()
        .with_timezone(&scheduler.timezone())
        .date_naive()
        .weekday();
    let never_today: HashSet<Weekday> = [today.succ()].into_iter().collect();

    let mut descriptor = fast_descriptor("wrong-day");
    descriptor.days_of_week = never_today;

    let mut registry = TaskRegistry::new();
    registry
        .register_fn(descriptor, move || {
            let r = Arc::clone(&r);
            Box::pin(async move {
                r.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
        .unwrap();

    scheduler.start(&registry).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.cancel_all();

    assert_eq!(ran.load(Ordering::SeqCst), 0, "task ran on a disallowed day");
    assert!(skipped.load(Ordering::SeqCst) >= 1, "no skip was recorded");

    executor.shutdown().await;
}

#[tokio::test]
async fn a_failing_task_never_blocks_its_next_fire() {
    let executor = ExecutorConfig::builder().build();

    let failures = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&failures);
    let scheduler = SchedulerConfig::builder(executor.clone())
        .on_task_failed(move |_task| {
            f.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let mut registry = TaskRegistry::new();
    registry
        .register_fn(fast_descriptor("flaky"), || {
            Box::pin(async { Err("database unavailable".into()) })
        })
        .unwrap();

    scheduler.start(&registry).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    scheduler.cancel_all();

    assert!(failures.load(Ordering::SeqCst) >= 2, "subsequent fires were blocked");
    executor.shutdown().await;
}

#[tokio::test]
async fn panicking_task_is_isolated() {
    let executor = ExecutorConfig::builder().build();

    let failures = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&failures);
    let scheduler = SchedulerConfig::builder(executor.clone())
        .on_task_failed(move |_task| {
            f.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let mut registry = TaskRegistry::new();
    registry
        .register_fn(fast_descriptor("panicky"), || {
            Box::pin(async { panic!("task bug") })
        })
        .unwrap();

    scheduler.start(&registry).unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    scheduler.cancel_all();

    assert!(failures.load(Ordering::SeqCst) >= 2);
    executor.shutdown().await;
}

#[tokio::test]
async fn cancel_all_tolerates_a_shut_down_executor() {
    let executor = ExecutorConfig::builder().build();
    let scheduler = SchedulerConfig::builder(executor.clone()).build();

    let mut registry = TaskRegistry::new();
    registry
        .register_fn(fast_descriptor("tick"), || Box::pin(async { Ok(()) }))
        .unwrap();
    scheduler.start(&registry).unwrap();

    executor.shutdown().await;
    scheduler.cancel_all();
    assert!(scheduler.is_cancelled());
}
