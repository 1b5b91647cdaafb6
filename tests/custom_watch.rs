// tests/custom_watch.rs
mod common;
use crate::common::{Calls, LogCapture};

use std::time::Duration;

use anyhow::anyhow;
use taskwatch::errors::Fatal;
use taskwatch::task::{TaskFuture, task_fn};
use taskwatch::watch::run_custom;
use taskwatch::{Registry, TaskError, TaskOptions};

/// Watch function whose n-th invocation (1-based) runs for `plan(n)` and then
/// succeeds (`Ok`) or fails (`Err`).
fn scripted<P>(calls: &Calls, plan: P) -> taskwatch::task::TaskFn
where
    P: Fn(usize) -> (Duration, bool) + Send + Sync + 'static,
{
    let calls = calls.clone();
    let plan = std::sync::Arc::new(plan);
    task_fn(move || {
        let calls = calls.clone();
        let plan = plan.clone();
        Box::pin(async move {
            let n = calls.bump();
            let (busy, ok) = plan(n);
            tokio::time::sleep(busy).await;
            if ok {
                Ok::<(), TaskError>(())
            } else {
                Err(anyhow!("server exited with status 1").into())
            }
        }) as TaskFuture
    })
}

#[tokio::test(start_paused = true)]
async fn immediate_failure_is_a_crash_loop() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let mut registry = Registry::new();
    let mut fatal_rx = registry.take_fatal_events().expect("first take");
    let task = registry.register(
        "serve",
        Calls::new().succeeding(Duration::ZERO),
        TaskOptions::new(),
    );

    let calls = Calls::new();
    let watch = scripted(&calls, |_| (Duration::from_millis(10), false));
    let handle = tokio::spawn(run_custom(task, watch));

    let fatal = fatal_rx.recv().await.expect("crash loop raised");
    assert_eq!(
        fatal,
        Fatal::CrashLoop {
            task: "serve".into()
        }
    );
    handle.await.expect("loop stops after a crash loop");

    assert_eq!(calls.get(), 1);
    assert_eq!(logs.count("task serve watch process failed:"), 1);
    assert_eq!(
        logs.count("task serve watch process failed within 5 sec, shutting down..."),
        1
    );
    assert_eq!(logs.count("restarting watch"), 0);
}

#[tokio::test(start_paused = true)]
async fn long_lived_failure_restarts_the_watch() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let mut registry = Registry::new();
    let mut fatal_rx = registry.take_fatal_events().expect("first take");
    let task = registry.register(
        "serve",
        Calls::new().succeeding(Duration::ZERO),
        TaskOptions::new(),
    );

    // Two long runs that fail after 6s, then a fast failure.
    let calls = Calls::new();
    let watch = scripted(&calls, |n| {
        if n <= 2 {
            (Duration::from_secs(6), false)
        } else {
            (Duration::from_millis(50), false)
        }
    });
    tokio::spawn(run_custom(task, watch));

    let fatal = fatal_rx.recv().await.expect("eventually a crash loop");
    assert!(matches!(fatal, Fatal::CrashLoop { .. }));
    assert_eq!(calls.get(), 3);
    assert_eq!(logs.count("task serve restarting watch..."), 2);
    assert_eq!(logs.count("task serve watch process failed:"), 3);
}

#[tokio::test(start_paused = true)]
async fn failure_just_past_the_window_is_not_a_crash_loop() {
    let mut registry = Registry::new();
    let mut fatal_rx = registry.take_fatal_events().expect("first take");
    let task = registry.register(
        "serve",
        Calls::new().succeeding(Duration::ZERO),
        TaskOptions::new(),
    );

    let calls = Calls::new();
    let watch = scripted(&calls, |n| {
        if n == 1 {
            (Duration::from_millis(5_001), false)
        } else {
            (Duration::from_secs(3600), true)
        }
    });
    tokio::spawn(run_custom(task, watch));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(calls.get(), 2, "restarted once and still running");
    assert!(fatal_rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn successful_return_reinvokes_the_watch() {
    let mut registry = Registry::new();
    let mut fatal_rx = registry.take_fatal_events().expect("first take");
    let task = registry.register(
        "serve",
        Calls::new().succeeding(Duration::ZERO),
        TaskOptions::new(),
    );

    let calls = Calls::new();
    let watch = scripted(&calls, |n| {
        if n <= 3 {
            (Duration::from_secs(1), true)
        } else {
            (Duration::ZERO, false)
        }
    });
    tokio::spawn(run_custom(task, watch));

    let fatal = fatal_rx.recv().await.expect("fourth call crash loops");
    assert!(matches!(fatal, Fatal::CrashLoop { .. }));
    assert_eq!(calls.get(), 4);
}
