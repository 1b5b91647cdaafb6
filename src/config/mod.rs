// src/config/mod.rs

//! Taskfile loading, validation and registration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a Taskfile from disk (`loader.rs`).
//! - Validate bodies, watch options, timeouts and step references
//!   (`validate.rs`).
//! - Register the validated tasks with a [`crate::Registry`] (`register.rs`).

pub mod loader;
pub mod model;
pub mod register;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, RawConfigFile, StepConfig, TaskConfig};
pub use register::{effective_timeout, register_tasks};
