#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use taskwatch::config::{ConfigFile, RawConfigFile, StepConfig, TaskConfig};

/// Builder for Taskfiles, either in memory or written to disk.
pub struct TaskfileBuilder {
    config: RawConfigFile,
}

impl TaskfileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid Taskfile from builder")
    }

    /// Render the Taskfile as TOML.
    pub fn to_toml(&self) -> String {
        let mut out = String::new();
        for (name, task) in &self.config.task {
            out.push_str(&format!("[task.{}]\n", quote(name)));
            if let Some(cmd) = &task.cmd {
                out.push_str(&format!("cmd = {}\n", quote(cmd)));
            }
            if !task.steps.is_empty() {
                let steps: Vec<String> = task
                    .steps
                    .iter()
                    .map(|step| match step {
                        StepConfig::Cmd { cmd } => format!("{{ cmd = {} }}", quote(cmd)),
                        StepConfig::Task { task } => format!("{{ task = {} }}", quote(task)),
                    })
                    .collect();
                out.push_str(&format!("steps = [{}]\n", steps.join(", ")));
            }
            if let Some(watch) = &task.watch {
                let patterns: Vec<String> = watch.iter().map(|p| quote(p)).collect();
                out.push_str(&format!("watch = [{}]\n", patterns.join(", ")));
            }
            if let Some(cmd) = &task.watch_cmd {
                out.push_str(&format!("watch_cmd = {}\n", quote(cmd)));
            }
            if let Some(timeout) = &task.timeout {
                out.push_str(&format!("timeout = {}\n", quote(timeout)));
            }
            if let Some(desc) = &task.description {
                out.push_str(&format!("description = {}\n", quote(desc)));
            }
            out.push('\n');
        }
        out
    }

    /// Write `Taskfile.toml` into `dir` and return its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("Taskfile.toml");
        std::fs::write(&path, self.to_toml()).expect("Failed to write Taskfile");
        path
    }
}

impl Default for TaskfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// TOML basic string.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn cmd(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn steps() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn step_cmd(mut self, cmd: &str) -> Self {
        self.task.steps.push(StepConfig::Cmd {
            cmd: cmd.to_string(),
        });
        self
    }

    pub fn step_task(mut self, task: &str) -> Self {
        self.task.steps.push(StepConfig::Task {
            task: task.to_string(),
        });
        self
    }

    pub fn watch(mut self, pattern: &str) -> Self {
        let watches = self.task.watch.get_or_insert(vec![]);
        watches.push(pattern.to_string());
        self
    }

    pub fn watch_cmd(mut self, cmd: &str) -> Self {
        self.task.watch_cmd = Some(cmd.to_string());
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.task.timeout = Some(timeout.to_string());
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.task.description = Some(desc.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
