// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, RawConfigFile, TaskConfig};
use crate::duration::parse_duration;
use crate::errors::{Result, TaskwatchError};
use crate::watch::InputPatterns;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let order = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.task, order))
    }
}

/// Validate `cfg` and return the task names in registration order.
fn validate_raw_config(cfg: &RawConfigFile) -> Result<Vec<String>> {
    ensure_has_tasks(cfg)?;
    for (name, task) in cfg.task.iter() {
        validate_task(name, task)?;
    }
    validate_step_references(cfg)?;
    registration_order(cfg)
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskwatchError::ConfigError(
            "Taskfile must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task(name: &str, task: &TaskConfig) -> Result<()> {
    match (&task.cmd, task.steps.is_empty()) {
        (Some(_), false) => {
            return Err(TaskwatchError::ConfigError(format!(
                "task '{name}' sets both `cmd` and `steps`"
            )));
        }
        (None, true) => {
            return Err(TaskwatchError::ConfigError(format!(
                "task '{name}' needs either `cmd` or a non-empty `steps` list"
            )));
        }
        _ => {}
    }

    if task.watch.is_some() && task.watch_cmd.is_some() {
        return Err(TaskwatchError::ConfigError(format!(
            "task '{name}' sets both `watch` and `watch_cmd`"
        )));
    }
    if let Some(patterns) = &task.watch {
        if patterns.is_empty() {
            return Err(TaskwatchError::ConfigError(format!(
                "task '{name}' has an empty `watch` list"
            )));
        }
        InputPatterns::compile(patterns.as_slice()).map_err(|e| {
            TaskwatchError::ConfigError(format!("task '{name}' has an invalid `watch`: {e:#}"))
        })?;
    }

    if let Some(timeout) = &task.timeout {
        parse_duration(timeout).map_err(|e| {
            TaskwatchError::ConfigError(format!("task '{name}' has an invalid `timeout`: {e}"))
        })?;
    }

    Ok(())
}

fn validate_step_references(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.referenced_tasks() {
            if dep == name {
                return Err(TaskwatchError::ConfigError(format!(
                    "task '{name}' cannot invoke itself in `steps`"
                )));
            }
            if !cfg.task.contains_key(dep) {
                return Err(TaskwatchError::ConfigError(format!(
                    "task '{name}' invokes unknown task '{dep}' in `steps`"
                )));
            }
        }
    }
    Ok(())
}

fn registration_order(cfg: &RawConfigFile) -> Result<Vec<String>> {
    // Edge direction: referenced -> referencing. For
    //   [task.B]
    //   steps = [{ task = "A" }]
    // we add edge A -> B.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }
    for (name, task) in cfg.task.iter() {
        for dep in task.referenced_tasks() {
            graph.add_edge(dep, name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(TaskwatchError::ConfigError(format!(
            "cycle detected in task steps involving task '{}'",
            cycle.node_id()
        ))),
    }
}
