// src/watch/custom.rs

//! Keep a task's custom long-running watch function alive.
//!
//! The function is expected to suspend until something relevant happens
//! (typically it owns a long-lived child process). It is re-invoked as soon
//! as it returns. A failure restarts it, unless the failing invocation lasted
//! less than [`CRASH_LOOP_WINDOW`], which is treated as a crash loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use crate::errors::{Fatal, TaskError};
use crate::task::{Task, TaskFn};

/// Failing faster than this is considered a persistent misconfiguration.
pub const CRASH_LOOP_WINDOW: Duration = Duration::from_secs(5);

/// Run `watch` for `task` forever, or until a crash loop is detected.
pub async fn run_custom(task: Arc<Task>, watch: TaskFn) {
    loop {
        let started = Instant::now();

        match watch().await {
            Ok(()) => {
                tokio::task::yield_now().await;
            }
            Err(err) => {
                error!("task {} watch process failed:\n{}", task.name(), describe(&err));

                if started.elapsed() < CRASH_LOOP_WINDOW {
                    error!(
                        "task {} watch process failed within 5 sec, shutting down...",
                        task.name()
                    );
                    task.fatal().raise(Fatal::CrashLoop {
                        task: task.name().to_string(),
                    });
                    return;
                }

                info!("task {} restarting watch...", task.name());
            }
        }
    }
}

fn describe(err: &TaskError) -> String {
    match err {
        TaskError::Root(detail) => format!("{detail:?}"),
        TaskError::Propagated { .. } => err.to_string(),
    }
}
