// src/engine/mod.rs

//! Orchestration engine.
//!
//! Runs the requested task once and, in watch mode, keeps every task that
//! ran and declares a watch option alive until a fatal condition or Ctrl-C.
//! The orchestration itself lives in [`orchestrator`].

pub mod orchestrator;

pub use orchestrator::{build, watch_all};

/// How a build ended; `main` maps it to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The task completed and no watch was requested.
    Success,
    /// Unknown task, task failure, timeout, watch activation or transport
    /// failure, or a crash-looping custom watch.
    Failure,
    /// Watch mode was stopped by Ctrl-C.
    Interrupted,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Failure => 1,
            Exit::Interrupted => 130,
        }
    }
}
