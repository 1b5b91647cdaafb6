// src/watch/mod.rs

//! Watch mode.
//!
//! This module is responsible for:
//! - Compiling a task's input patterns (`globset`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) with a
//!   per-path debounce.
//! - The two watch loops: [`debounced`] for input patterns and [`custom`]
//!   for long-running watch functions.
//!
//! [`activate`] starts the right loop for a task, at most once per task.

pub mod custom;
pub mod debounce;
pub mod debounced;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::errors::{Result, TaskwatchError};
use crate::task::{Task, WatchSpec};

pub use debounced::{Admission, GateState, RunGate, run_debounced};
pub use custom::{CRASH_LOOP_WINDOW, run_custom};
pub use patterns::{InputPatterns, WatchRoot};
pub use watcher::{
    ChangeKind, DEBOUNCE_WINDOW, FileChange, WatchNotification, WatcherHandle, spawn_watcher,
};

/// Start the watch loop of `task`, resolving input patterns against the
/// current working directory.
///
/// Returns `Ok(false)` without doing anything if the task is already being
/// watched. Fails for tasks without a watch option or with an empty input
/// list. Must be called from within a Tokio runtime; the loop runs in the
/// background and this returns immediately.
pub fn activate(task: &Arc<Task>) -> Result<bool> {
    let cwd = std::env::current_dir()?;
    activate_in(task, &cwd)
}

/// Like [`activate`], with input patterns relative to `root`.
///
/// The task is only marked as watching once its subscription is in place;
/// a failed activation leaves it eligible for a later attempt.
pub fn activate_in(task: &Arc<Task>, root: &Path) -> Result<bool> {
    let spec = task
        .watch_spec()
        .ok_or_else(|| TaskwatchError::WatchUnsupported(task.name().to_string()))?;

    if task.is_watching() {
        return Ok(false);
    }

    match spec {
        WatchSpec::Inputs(inputs) => {
            if inputs.is_empty() {
                return Err(TaskwatchError::NoWatchInputs(task.name().to_string()));
            }
            let patterns = InputPatterns::compile(inputs.as_slice())?;
            let (handle, notifications) = spawn_watcher(root, patterns, DEBOUNCE_WINDOW)?;
            if !task.claim_watch() {
                return Ok(false);
            }

            let watched = Arc::clone(task);
            let root = root.to_path_buf();
            tokio::spawn(async move {
                let _handle = handle;
                run_debounced(watched, notifications, root).await;
            });
        }
        WatchSpec::Custom(watch) => {
            if !task.claim_watch() {
                return Ok(false);
            }
            tokio::spawn(run_custom(Arc::clone(task), Arc::clone(watch)));
        }
    }

    info!("task {} watching...", task.name());
    Ok(true)
}
