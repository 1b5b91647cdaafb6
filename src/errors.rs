// src/errors.rs

//! Crate-wide error types.
//!
//! Two families live here:
//! - [`TaskError`] is what a task body and a wrapped `run` produce. It is a
//!   tagged variant so the runner can tell a failure that originated in *this*
//!   body from one that only propagated through it.
//! - [`TaskwatchError`] covers configuration and orchestration failures that
//!   never reach a task runner.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::duration::format_duration;
use crate::task::TaskName;

/// Failure of a task run.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The failure originated in the body itself; `detail` is the raw error.
    #[error("{0:#}")]
    Root(#[from] anyhow::Error),

    /// A task this one is chained to failed. Its detail was already logged by
    /// the runner of `from_task`.
    #[error("task {from_task} failed")]
    Propagated { from_task: TaskName },
}

impl TaskError {
    /// Name of the task whose failure is the root cause, if this error was
    /// already tagged by a runner.
    pub fn from_task(&self) -> Option<&str> {
        match self {
            TaskError::Root(_) => None,
            TaskError::Propagated { from_task } => Some(from_task),
        }
    }

    pub fn is_propagated(&self) -> bool {
        self.from_task().is_some()
    }
}

impl From<std::io::Error> for TaskError {
    fn from(err: std::io::Error) -> Self {
        TaskError::Root(err.into())
    }
}

#[derive(Error, Debug)]
pub enum TaskwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown task: {0}")]
    TaskNotFound(String),

    #[error("Task {0} has no watch option and cannot be watched.")]
    WatchUnsupported(TaskName),

    #[error("Task {0} has no inputs and cannot be watched.")]
    NoWatchInputs(TaskName),

    #[error("No tasks have a watch options -- nothing to watch.")]
    NothingToWatch,

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskwatchError>;

/// Conditions after which the process cannot meaningfully continue.
///
/// Raised by the task runner and the watch loops; whoever owns the
/// [`FatalReceiver`] is expected to terminate the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fatal {
    TimedOut { task: TaskName, allowed: Duration },
    WatchTransport { task: TaskName, detail: String },
    CrashLoop { task: TaskName },
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fatal::TimedOut { task, allowed } => write!(
                f,
                "task {task} did not complete within {}",
                format_duration(*allowed)
            ),
            Fatal::WatchTransport { task, detail } => {
                write!(f, "task {task} watch error: {detail}")
            }
            Fatal::CrashLoop { task } => {
                write!(f, "task {task} watch process failed within 5 sec")
            }
        }
    }
}

pub type FatalReceiver = tokio::sync::mpsc::UnboundedReceiver<Fatal>;

/// Cloneable handle used to raise a [`Fatal`].
#[derive(Debug, Clone)]
pub struct FatalSender {
    tx: tokio::sync::mpsc::UnboundedSender<Fatal>,
}

impl FatalSender {
    pub fn channel() -> (FatalSender, FatalReceiver) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (FatalSender { tx }, rx)
    }

    pub fn raise(&self, fatal: Fatal) {
        if self.tx.send(fatal).is_err() {
            tracing::debug!("fatal receiver dropped; nobody left to terminate the process");
        }
    }
}
