// src/lib.rs

pub mod cli;
pub mod config;
pub mod duration;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;
pub mod watch;

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, StepConfig, effective_timeout, load_and_validate, register_tasks};
use crate::duration::format_duration;

pub use crate::cli::BuildArgs;
pub use crate::engine::{Exit, build, watch_all};
pub use crate::errors::{TaskError, TaskwatchError};
pub use crate::exec::exec;
pub use crate::task::{Registry, Task, TaskOptions, WatchSpec};

/// High-level entry point used by `main.rs`.
///
/// Loads the Taskfile, registers its tasks and hands over to [`build`].
pub async fn run(args: CliArgs) -> Result<Exit> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.list {
        print_task_list(&cfg);
        return Ok(Exit::Success);
    }

    let mut registry = Registry::new();
    register_tasks(&cfg, &mut registry)?;
    debug!(tasks = registry.len(), config = %config_path.display(), "Taskfile loaded");

    Ok(build(registry, &args.build).await)
}

/// Print tasks, their bodies and watch options.
fn print_task_list(cfg: &ConfigFile) {
    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        match &task.description {
            Some(desc) => println!("  - {name}: {desc}"),
            None => println!("  - {name}"),
        }
        if let Some(ref cmd) = task.cmd {
            println!("      cmd: {cmd}");
        }
        for step in &task.steps {
            match step {
                StepConfig::Cmd { cmd } => println!("      step: {cmd}"),
                StepConfig::Task { task } => println!("      step: task {task}"),
            }
        }
        if let Some(ref watch) = task.watch {
            println!("      watch: {watch:?}");
        }
        if let Some(ref cmd) = task.watch_cmd {
            println!("      watch_cmd: {cmd}");
        }
        if task.timeout.is_some() {
            let timeout = effective_timeout(task);
            if timeout.is_zero() {
                println!("      timeout: disabled");
            } else {
                println!("      timeout: {}", format_duration(timeout));
            }
        }
    }

    debug!("task listing complete (no execution)");
}
