// src/exec/mod.rs

//! Process execution layer.
//!
//! Task bodies use [`exec`] to run shell commands through
//! `tokio::process::Command`, with the child's output streamed to our own
//! standard streams.

pub mod command;

pub use command::exec;
