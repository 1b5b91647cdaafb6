// src/task/registry.rs

//! Name -> task mapping.
//!
//! The registry is built once at startup and then shared by reference with
//! the orchestrator. Registration order is preserved for listings; a second
//! registration under an existing name replaces the earlier task in place.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{FatalReceiver, FatalSender, TaskError};

use super::{Task, TaskName, TaskOptions, task_fn};

#[derive(Debug)]
pub struct Registry {
    tasks: Vec<Arc<Task>>,
    fatal: FatalSender,
    fatal_rx: Option<FatalReceiver>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let (fatal, fatal_rx) = FatalSender::channel();
        Self {
            tasks: Vec::new(),
            fatal,
            fatal_rx: Some(fatal_rx),
        }
    }

    /// Register a task and return a handle to it.
    ///
    /// The handle is what other task bodies call to chain tasks:
    /// `lint.run().await?` inside another body propagates a tagged failure.
    pub fn register<F, Fut>(
        &mut self,
        name: impl Into<TaskName>,
        body: F,
        options: TaskOptions,
    ) -> Arc<Task>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let task = Arc::new(Task::new(
            name.into(),
            task_fn(body),
            options,
            self.fatal.clone(),
        ));
        self.insert(Arc::clone(&task));
        task
    }

    fn insert(&mut self, task: Arc<Task>) {
        match self.tasks.iter_mut().find(|t| t.name() == task.name()) {
            Some(slot) => {
                warn!(task = %task.name(), "task registered twice; replacing earlier definition");
                *slot = task;
            }
            None => {
                debug!(task = %task.name(), "task registered");
                self.tasks.push(task);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Task>> {
        self.tasks.iter().find(|t| t.name() == name).cloned()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Arc<Task>> {
        self.tasks.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Take the receiving end of the fatal channel.
    ///
    /// Only the first caller gets it; the orchestrator does this once.
    pub fn take_fatal_events(&mut self) -> Option<FatalReceiver> {
        self.fatal_rx.take()
    }
}
