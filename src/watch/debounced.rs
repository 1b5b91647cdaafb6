// src/watch/debounced.rs

//! Re-run a task whenever one of its input files changes.
//!
//! Runs of the same task never overlap. A change arriving while a run is in
//! flight marks the task as queued; however many changes arrive during that
//! window, exactly one extra run follows the current one.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::errors::Fatal;
use crate::task::Task;
use crate::watch::path_utils::display_path;
use crate::watch::watcher::WatchNotification;

/// The `running` / `queued` flag pair of one watch loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    pub running: bool,
    pub queued: bool,
}

/// Decision taken for an incoming trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Nothing in flight: the caller must start a run now.
    Start,
    /// A run is in flight or already queued: folded into one pending re-run.
    Queued,
}

/// Serialises runs of one task.
///
/// The lock is only held for flag transitions, never across an await.
#[derive(Debug, Default)]
pub struct RunGate {
    state: Mutex<GateState>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> GateState {
        *self.lock()
    }

    pub fn trigger(&self) -> Admission {
        let mut state = self.lock();
        if state.running || state.queued {
            state.queued = true;
            Admission::Queued
        } else {
            state.running = true;
            state.queued = false;
            Admission::Start
        }
    }

    /// Record the end of a run. Returns true if a queued re-run must start;
    /// in that case the gate is already back in the running state.
    pub fn finish_run(&self) -> bool {
        let mut state = self.lock();
        if state.queued {
            state.running = true;
            state.queued = false;
            true
        } else {
            state.running = false;
            false
        }
    }
}

/// Drive `task` from a stream of change notifications until the stream ends
/// or the subscription fails.
///
/// A subscription failure raises [`Fatal::WatchTransport`]: without a
/// working subscription the watch cannot continue.
pub async fn run_debounced(
    task: Arc<Task>,
    mut notifications: mpsc::UnboundedReceiver<WatchNotification>,
    cwd: PathBuf,
) {
    let gate = Arc::new(RunGate::new());

    while let Some(notification) = notifications.recv().await {
        let change = match notification {
            Ok(change) => change,
            Err(err) => {
                error!("task watch error: {err}");
                task.fatal().raise(Fatal::WatchTransport {
                    task: task.name().to_string(),
                    detail: err.to_string(),
                });
                return;
            }
        };

        info!("task {} detected:", task.name());
        info!("  [{}] {}", change.kind, display_path(&cwd, &change.path));

        match gate.trigger() {
            Admission::Queued => info!("task {} queued...", task.name()),
            Admission::Start => {
                tokio::spawn(rerun_until_settled(Arc::clone(&task), Arc::clone(&gate)));
            }
        }
    }

    debug!(task = %task.name(), "notification stream closed; watch loop ended");
}

async fn rerun_until_settled(task: Arc<Task>, gate: Arc<RunGate>) {
    loop {
        if let Err(err) = task.run().await {
            // Detail was logged by the runner; the watch keeps going.
            warn!(task = %task.name(), error = %err, "watched run failed; waiting for changes");
        }
        if !gate.finish_run() {
            break;
        }
    }
}
