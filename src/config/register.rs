// src/config/register.rs

//! Turn a validated [`ConfigFile`] into registered tasks.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::model::{ConfigFile, StepConfig, TaskConfig};
use crate::duration::parse_duration;
use crate::errors::{Result, TaskError, TaskwatchError};
use crate::exec::exec;
use crate::task::{DEFAULT_TIMEOUT, Registry, Task, TaskOptions};

/// A step with its task reference resolved to the registered handle.
enum Step {
    Cmd(String),
    Task(Arc<Task>),
}

/// Register every task of `cfg` with `registry`.
///
/// Tasks are registered in the config's registration order, so a step that
/// invokes another task can hold that task's handle.
pub fn register_tasks(cfg: &ConfigFile, registry: &mut Registry) -> Result<()> {
    for name in cfg.registration_order() {
        let task_cfg = cfg.task.get(name).ok_or_else(|| {
            TaskwatchError::ConfigError(format!("task '{name}' missing from Taskfile"))
        })?;

        let steps = Arc::new(resolve_steps(name, task_cfg, registry)?);
        let options = task_options(name, task_cfg)?;

        registry.register(
            name.as_str(),
            move || run_steps(Arc::clone(&steps)),
            options,
        );
        debug!(task = %name, "registered from Taskfile");
    }
    Ok(())
}

fn resolve_steps(name: &str, task: &TaskConfig, registry: &Registry) -> Result<Vec<Step>> {
    if let Some(cmd) = &task.cmd {
        return Ok(vec![Step::Cmd(cmd.clone())]);
    }

    task.steps
        .iter()
        .map(|step| match step {
            StepConfig::Cmd { cmd } => Ok(Step::Cmd(cmd.clone())),
            StepConfig::Task { task } => registry.get(task).map(Step::Task).ok_or_else(|| {
                TaskwatchError::ConfigError(format!(
                    "task '{name}' invokes '{task}' before it is registered"
                ))
            }),
        })
        .collect()
}

fn task_options(name: &str, task: &TaskConfig) -> Result<TaskOptions> {
    let timeout = match &task.timeout {
        Some(raw) => parse_duration(raw).map_err(|e| {
            TaskwatchError::ConfigError(format!("task '{name}' has an invalid `timeout`: {e}"))
        })?,
        None => DEFAULT_TIMEOUT,
    };

    let mut options = TaskOptions::new().timeout(timeout);
    if let Some(patterns) = &task.watch {
        options = options.watch_inputs(patterns.iter().cloned());
    } else if let Some(cmd) = &task.watch_cmd {
        let cmd: Arc<str> = Arc::from(cmd.as_str());
        options = options.watch_with(move || {
            let cmd = Arc::clone(&cmd);
            async move { exec(&cmd).await.map_err(TaskError::from) }
        });
    }
    Ok(options)
}

async fn run_steps(steps: Arc<Vec<Step>>) -> std::result::Result<(), TaskError> {
    for step in steps.iter() {
        match step {
            Step::Cmd(cmd) => exec(cmd).await?,
            Step::Task(task) => task.run().await?,
        }
    }
    Ok(())
}

/// The effective timeout of a task, for listings.
pub fn effective_timeout(task: &TaskConfig) -> Duration {
    task.timeout
        .as_deref()
        .and_then(|raw| parse_duration(raw).ok())
        .unwrap_or(DEFAULT_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_str;
    use crate::task::WatchSpec;

    fn registry_for(toml: &str) -> Registry {
        let cfg = ConfigFile::try_from(parse_str(toml).expect("parses")).expect("valid");
        let mut registry = Registry::new();
        register_tasks(&cfg, &mut registry).expect("registers");
        registry
    }

    #[test]
    fn options_follow_the_taskfile() {
        let registry = registry_for(
            r#"
            [task.fast]
            cmd = "true"
            timeout = "0s"
            watch = ["src/**/*.rs"]

            [task.serve]
            cmd = "true"
            watch_cmd = "sleep 100"

            [task.plain]
            cmd = "true"
            "#,
        );

        let fast = registry.get("fast").expect("fast");
        assert_eq!(fast.timeout(), Duration::ZERO);
        assert!(matches!(fast.watch_spec(), Some(WatchSpec::Inputs(p)) if p == &["src/**/*.rs"]));

        let serve = registry.get("serve").expect("serve");
        assert!(matches!(serve.watch_spec(), Some(WatchSpec::Custom(_))));

        let plain = registry.get("plain").expect("plain");
        assert_eq!(plain.timeout(), DEFAULT_TIMEOUT);
        assert!(!plain.can_watch());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn task_steps_chain_through_run() {
        let registry = registry_for(
            r#"
            [task.lint]
            cmd = "true"

            [task.default]
            steps = [{ task = "lint" }, { cmd = "true" }]
            "#,
        );

        let default = registry.get("default").expect("default");
        default.run().await.expect("chain succeeds");
        assert!(registry.get("lint").expect("lint").ran_at_least_once());
        assert!(default.ran_at_least_once());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_step_is_tagged_with_its_task() {
        let registry = registry_for(
            r#"
            [task.broken]
            cmd = "exit 3"

            [task.default]
            steps = [{ task = "broken" }, { cmd = "true" }]
            "#,
        );

        let err = registry
            .get("default")
            .expect("default")
            .run()
            .await
            .unwrap_err();
        assert_eq!(err.from_task(), Some("default"));
        assert!(!registry.get("broken").expect("broken").ran_at_least_once());
    }
}
