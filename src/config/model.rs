// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Taskfile as read from TOML, before validation.
///
/// ```toml
/// [task.lint]
/// cmd = "cargo clippy"
///
/// [task.default]
/// steps = [{ task = "lint" }, { cmd = "cargo build" }]
/// watch = ["src/**/*.rs"]
/// timeout = "2m"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// A validated Taskfile.
///
/// Constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), which
/// also records a registration order where every task comes after the tasks
/// its steps reference.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub task: BTreeMap<String, TaskConfig>,
    order: Vec<String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(task: BTreeMap<String, TaskConfig>, order: Vec<String>) -> Self {
        Self { task, order }
    }

    /// Task names, referenced tasks first.
    pub fn registration_order(&self) -> &[String] {
        &self.order
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Shell command forming the whole body.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Ordered steps forming the body; used instead of `cmd`.
    #[serde(default)]
    pub steps: Vec<StepConfig>,

    /// Input patterns; a change to a matching file re-runs the task.
    #[serde(default)]
    pub watch: Option<Vec<String>>,

    /// Long-running command kept alive in watch mode, restarted on failure.
    #[serde(default)]
    pub watch_cmd: Option<String>,

    /// e.g. `"90s"`, `"2m"`. `"0s"` disables the timeout.
    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// One entry of `steps`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StepConfig {
    /// `{ cmd = "..." }`
    Cmd { cmd: String },
    /// `{ task = "..." }`
    Task { task: String },
}

impl TaskConfig {
    /// Names of the tasks this task's steps invoke, in step order.
    pub fn referenced_tasks(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            StepConfig::Task { task } => Some(task.as_str()),
            StepConfig::Cmd { .. } => None,
        })
    }
}
