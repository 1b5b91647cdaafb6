// tests/task_chaining.rs
mod common;
use crate::common::{Calls, LogCapture, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use taskwatch::{Registry, TaskError, TaskOptions};

#[tokio::test]
async fn root_failure_detail_is_logged_once_across_chain() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    with_timeout(async {
        let mut registry = Registry::new();
        let compile = registry.register(
            "compile",
            Calls::new().failing(Duration::ZERO, "linker exploded"),
            TaskOptions::default(),
        );
        let package = registry.register(
            "package",
            move || {
                let compile = Arc::clone(&compile);
                async move { compile.run().await }
            },
            TaskOptions::default(),
        );
        let release = registry.register(
            "release",
            move || {
                let package = Arc::clone(&package);
                async move { package.run().await }
            },
            TaskOptions::default(),
        );

        let err = release.run().await.expect_err("chain must fail");
        assert_eq!(err.from_task(), Some("release"));
        assert_eq!(err.to_string(), "task release failed");
    })
    .await;

    assert_eq!(logs.count("linker exploded"), 1, "{}", logs.contents());
    assert_eq!(logs.count("task compile failed:"), 1);
    assert_eq!(logs.count("task package failed: task compile failed"), 1);
    assert_eq!(logs.count("task release failed: task package failed"), 1);
    assert_eq!(logs.count("completed ["), 0);
}

#[tokio::test]
async fn successful_chain_logs_start_and_completion_per_task() {
    let logs = LogCapture::new();
    let _guard = logs.install();

    let mut registry = Registry::new();
    let lint_calls = Calls::new();
    let lint = registry.register(
        "lint",
        lint_calls.succeeding(Duration::ZERO),
        TaskOptions::default(),
    );
    let default = registry.register(
        "default",
        move || {
            let lint = Arc::clone(&lint);
            async move {
                lint.run().await?;
                lint.run().await
            }
        },
        TaskOptions::default(),
    );

    with_timeout(default.run()).await.expect("chain succeeds");

    assert_eq!(lint_calls.get(), 2);
    assert_eq!(logs.count("task lint starting..."), 2);
    assert_eq!(logs.count("task lint completed ["), 2);
    assert_eq!(logs.count("task default starting..."), 1);
    assert!(registry.get("lint").expect("lint").ran_at_least_once());
    assert!(default.ran_at_least_once());
}

#[tokio::test]
async fn body_may_recover_from_a_chained_failure() {
    let mut registry = Registry::new();
    let flaky = registry.register(
        "flaky",
        Calls::new().failing(Duration::ZERO, "network down"),
        TaskOptions::default(),
    );
    let tolerant = registry.register(
        "tolerant",
        move || {
            let flaky = Arc::clone(&flaky);
            async move {
                if let Err(err) = flaky.run().await {
                    assert_eq!(err.from_task(), Some("flaky"));
                }
                Ok::<(), TaskError>(())
            }
        },
        TaskOptions::default(),
    );

    with_timeout(tolerant.run()).await.expect("recovered");
    assert!(tolerant.ran_at_least_once());
    assert!(!registry.get("flaky").expect("flaky").ran_at_least_once());
}

#[tokio::test(start_paused = true)]
async fn timed_out_dependency_raises_fatal_for_that_task() {
    let mut registry = Registry::new();
    let mut fatal_rx = registry.take_fatal_events().expect("first take");

    let stuck = registry.register(
        "stuck",
        Calls::new().succeeding(Duration::from_secs(3600)),
        TaskOptions::default().timeout(Duration::from_secs(2)),
    );
    let outer = registry.register(
        "outer",
        move || {
            let stuck = Arc::clone(&stuck);
            async move { stuck.run().await }
        },
        TaskOptions::default().no_timeout(),
    );

    let run = tokio::spawn(async move { outer.run().await });
    let fatal = fatal_rx.recv().await.expect("timeout raised");
    assert_eq!(fatal.to_string(), "task stuck did not complete within 2s");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!run.is_finished(), "a timed-out run never settles");
}
