// src/task/mod.rs

//! Task records.
//!
//! A [`Task`] bundles a name, an opaque asynchronous body, a timeout and an
//! optional watch capability. Callers never invoke the body directly; they go
//! through [`Task::run`], which adds logging, the timeout guard and error
//! tagging (see [`runner`]).
//!
//! - [`registry`] owns the name -> task mapping.
//! - [`runner`] implements the wrapped `run`.

pub mod registry;
pub mod runner;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::errors::{FatalSender, TaskError};

pub use registry::Registry;

/// Canonical task name type.
pub type TaskName = String;

/// Future produced by a task body or a custom watch function.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// A nullary, re-invocable unit of work.
pub type TaskFn = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Run time allowed before a task is considered hung.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Box a closure returning a future into a [`TaskFn`].
pub fn task_fn<F, Fut>(f: F) -> TaskFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as TaskFuture)
}

/// How a task is re-run in watch mode.
#[derive(Clone)]
pub enum WatchSpec {
    /// Re-run whenever a file matching one of these patterns changes.
    Inputs(Vec<String>),
    /// Keep this long-running function alive, restarting it when it fails.
    Custom(TaskFn),
}

impl fmt::Debug for WatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchSpec::Inputs(inputs) => f.debug_tuple("Inputs").field(inputs).finish(),
            WatchSpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-task options accepted by [`Registry::register`].
#[derive(Debug, Clone)]
pub struct TaskOptions {
    /// `Duration::ZERO` disables the timeout guard.
    pub timeout: Duration,
    pub watch: Option<WatchSpec>,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            watch: None,
        }
    }
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn no_timeout(self) -> Self {
        self.timeout(Duration::ZERO)
    }

    pub fn watch_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watch = Some(WatchSpec::Inputs(
            inputs.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn watch_with<F, Fut>(mut self, watch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.watch = Some(WatchSpec::Custom(task_fn(watch)));
        self
    }
}

/// A registered task.
pub struct Task {
    name: TaskName,
    body: TaskFn,
    timeout: Duration,
    watch: Option<WatchSpec>,
    ran_at_least_once: AtomicBool,
    watching: AtomicBool,
    fatal: FatalSender,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("watch", &self.watch)
            .field("ran_at_least_once", &self.ran_at_least_once())
            .field("watching", &self.is_watching())
            .finish_non_exhaustive()
    }
}

impl Task {
    pub(crate) fn new(
        name: TaskName,
        body: TaskFn,
        options: TaskOptions,
        fatal: FatalSender,
    ) -> Self {
        Self {
            name,
            body,
            timeout: options.timeout,
            watch: options.watch,
            ran_at_least_once: AtomicBool::new(false),
            watching: AtomicBool::new(false),
            fatal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn watch_spec(&self) -> Option<&WatchSpec> {
        self.watch.as_ref()
    }

    pub fn can_watch(&self) -> bool {
        self.watch.is_some()
    }

    /// True once a `run` has completed successfully.
    pub fn ran_at_least_once(&self) -> bool {
        self.ran_at_least_once.load(Ordering::Acquire)
    }

    pub fn is_watching(&self) -> bool {
        self.watching.load(Ordering::Acquire)
    }

    pub(crate) fn mark_ran(&self) {
        self.ran_at_least_once.store(true, Ordering::Release);
    }

    /// Flip `watching` to true. Returns false if it already was.
    pub(crate) fn claim_watch(&self) -> bool {
        !self.watching.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn fatal(&self) -> &FatalSender {
        &self.fatal
    }
}
