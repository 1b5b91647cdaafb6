// tests/taskfile_config.rs
mod common;
use crate::common::builders::{TaskConfigBuilder, TaskfileBuilder};
use crate::common::init_tracing;

use std::time::Duration;

use tempfile::TempDir;

use taskwatch::Registry;
use taskwatch::config::{load_and_validate, register_tasks};
use taskwatch::errors::TaskwatchError;
use taskwatch::task::{DEFAULT_TIMEOUT, WatchSpec};

fn sample() -> TaskfileBuilder {
    TaskfileBuilder::new()
        .with_task(
            "lint",
            TaskConfigBuilder::cmd("cargo clippy")
                .description("Run clippy")
                .build(),
        )
        .with_task(
            "default",
            TaskConfigBuilder::steps()
                .step_task("lint")
                .step_cmd("cargo build")
                .watch("src/**/*.rs")
                .watch("Cargo.toml")
                .timeout("2m")
                .build(),
        )
        .with_task(
            "serve",
            TaskConfigBuilder::cmd("cargo build")
                .watch_cmd("cargo run --bin server")
                .timeout("0s")
                .build(),
        )
}

#[test]
fn taskfile_on_disk_loads_and_registers() {
    init_tracing();
    let dir = TempDir::new().expect("tempdir");
    let path = sample().write_to(dir.path());

    let cfg = load_and_validate(&path).expect("valid Taskfile");
    assert_eq!(cfg.task.len(), 3);
    assert_eq!(
        cfg.task["lint"].description.as_deref(),
        Some("Run clippy")
    );

    let mut registry = Registry::new();
    register_tasks(&cfg, &mut registry).expect("registers");
    assert_eq!(registry.len(), 3);

    let default = registry.get("default").expect("default");
    assert_eq!(default.timeout(), Duration::from_secs(120));
    match default.watch_spec() {
        Some(WatchSpec::Inputs(patterns)) => {
            assert_eq!(patterns, &["src/**/*.rs", "Cargo.toml"]);
        }
        other => panic!("expected input patterns, got {other:?}"),
    }

    let serve = registry.get("serve").expect("serve");
    assert_eq!(serve.timeout(), Duration::ZERO);
    assert!(matches!(serve.watch_spec(), Some(WatchSpec::Custom(_))));

    let lint = registry.get("lint").expect("lint");
    assert_eq!(lint.timeout(), DEFAULT_TIMEOUT);
    assert!(!lint.can_watch());
}

#[test]
fn lint_is_registered_before_the_task_that_invokes_it() {
    let cfg = sample().build();
    let order = cfg.registration_order();
    let lint = order.iter().position(|n| n == "lint").expect("lint");
    let default = order.iter().position(|n| n == "default").expect("default");
    assert!(lint < default);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let result = load_and_validate(dir.path().join("Taskfile.toml"));
    assert!(matches!(result, Err(TaskwatchError::IoError(_))));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("Taskfile.toml");
    std::fs::write(&path, "[task.a\ncmd = ").expect("write");

    assert!(matches!(
        load_and_validate(&path),
        Err(TaskwatchError::TomlError(_))
    ));
}

#[test]
fn cyclic_steps_are_a_config_error() {
    let raw = TaskfileBuilder::new()
        .with_task("a", TaskConfigBuilder::steps().step_task("b").build())
        .with_task("b", TaskConfigBuilder::steps().step_task("a").build())
        .raw();

    match taskwatch::config::ConfigFile::try_from(raw) {
        Err(TaskwatchError::ConfigError(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('a') || msg.contains('b'));
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}

#[test]
fn watch_and_watch_cmd_together_are_rejected() {
    let raw = TaskfileBuilder::new()
        .with_task(
            "serve",
            TaskConfigBuilder::cmd("true")
                .watch("src/**")
                .watch_cmd("run-server")
                .build(),
        )
        .raw();

    assert!(matches!(
        taskwatch::config::ConfigFile::try_from(raw),
        Err(TaskwatchError::ConfigError(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn quoted_commands_survive_the_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let marker = dir.path().join("out.txt");
    let cmd = format!("printf '%s' \"hi there\" > '{}'", marker.display());
    let path = TaskfileBuilder::new()
        .with_task("default", TaskConfigBuilder::cmd(&cmd).build())
        .write_to(dir.path());

    let cfg = load_and_validate(&path).expect("valid Taskfile");
    let mut registry = Registry::new();
    register_tasks(&cfg, &mut registry).expect("registers");
    registry
        .get("default")
        .expect("default")
        .run()
        .await
        .expect("command succeeds");

    assert_eq!(std::fs::read_to_string(&marker).expect("marker"), "hi there");
}
