// src/task/runner.rs

//! The wrapped, invocable form of a task body.
//!
//! Every invocation:
//! - logs `task {name} starting...`
//! - arms the timeout guard (unless the timeout is zero)
//! - awaits the body
//! - logs `task {name} completed [{duration}]` on success, or tags the
//!   failure with this task's name so callers further up only log the
//!   propagation chain.

use anyhow::anyhow;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info};

use crate::duration::format_duration;
use crate::errors::{Fatal, TaskError};

use super::Task;

impl Task {
    /// Run the task body once.
    ///
    /// On timeout this never returns: a [`Fatal::TimedOut`] is raised and the
    /// invocation stays suspended until the process is torn down.
    pub async fn run(&self) -> Result<(), TaskError> {
        info!("task {} starting...", self.name);
        let started = Instant::now();

        let result = if self.timeout.is_zero() {
            (self.body)().await
        } else {
            tokio::select! {
                res = (self.body)() => res,
                _ = sleep(self.timeout) => {
                    let fatal = Fatal::TimedOut {
                        task: self.name.clone(),
                        allowed: self.timeout,
                    };
                    error!("{fatal}, shutting down...");
                    self.fatal.raise(fatal);
                    std::future::pending::<Result<(), TaskError>>().await
                }
            }
        };

        match result {
            Ok(()) => {
                info!(
                    "task {} completed [{}]",
                    self.name,
                    format_duration(started.elapsed())
                );
                self.mark_ran();
                Ok(())
            }
            Err(err) => Err(self.tag_failure(err)),
        }
    }

    /// Run the task, rejecting any positional arguments.
    ///
    /// Tasks are strictly nullary; a non-empty `args` is a configuration
    /// error and the body is never invoked.
    pub async fn run_with_args(&self, args: &[String]) -> Result<(), TaskError> {
        if !args.is_empty() {
            let err = anyhow!(
                "Tasks do not support arguments (provided: {})",
                args.join(", ")
            );
            return Err(self.tag_failure(err.into()));
        }
        self.run().await
    }

    /// Log a failure once and re-tag it with this task's name.
    ///
    /// Root failures have their detail printed here; propagated ones only
    /// name the task they came from.
    fn tag_failure(&self, err: TaskError) -> TaskError {
        match &err {
            TaskError::Propagated { from_task } => {
                error!("task {} failed: task {} failed", self.name, from_task);
            }
            TaskError::Root(detail) => {
                error!("task {} failed:\n{:?}", self.name, detail);
            }
        }
        debug!(task = %self.name, "re-raising tagged task error");
        TaskError::Propagated {
            from_task: self.name.clone(),
        }
    }
}
