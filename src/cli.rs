// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! [`BuildArgs`] is the part every task runner binary shares: the task name,
//! `--watch` and the log level. [`CliArgs`] adds the options of the
//! Taskfile-driven `taskwatch` binary.

use clap::{Args, Parser, ValueEnum};

/// Arguments understood by [`crate::build`].
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Task to run.
    #[arg(value_name = "TASK", default_value = "default")]
    pub task: String,

    /// Arguments passed to the task. Tasks take none; any value here fails
    /// the run.
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Keep running and re-run tasks when their inputs change.
    #[arg(long)]
    pub watch: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl BuildArgs {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            args: Vec::new(),
            watch: false,
            log_level: None,
        }
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }
}

/// Standalone parser for binaries that register their tasks in code.
#[derive(Debug, Clone, Parser)]
#[command(version, about = "Run a registered task, optionally watching its inputs.")]
pub struct BuildCli {
    #[command(flatten)]
    pub build: BuildArgs,
}

/// Command-line arguments for `taskwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskwatch",
    version,
    about = "Run tasks from a Taskfile and re-run them when their inputs change.",
    long_about = None
)]
pub struct CliArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Path to the Taskfile (TOML).
    #[arg(long, value_name = "PATH", default_value = "Taskfile.toml")]
    pub config: String,

    /// List the tasks defined in the Taskfile and exit.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
