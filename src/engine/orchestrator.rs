// src/engine/orchestrator.rs

use tracing::{debug, error, info, warn};

use crate::cli::BuildArgs;
use crate::errors::{FatalReceiver, Result, TaskwatchError};
use crate::task::Registry;
use crate::watch;

use super::Exit;

/// Run the task named in `args`, then optionally switch to watch mode.
///
/// Without `--watch` this returns as soon as the run settles. With it, the
/// future only resolves once a watch loop raises a fatal condition or the
/// process receives Ctrl-C.
pub async fn build(mut registry: Registry, args: &BuildArgs) -> Exit {
    let Some(mut fatal_rx) = registry.take_fatal_events() else {
        error!("fatal event channel already taken; cannot supervise tasks");
        return Exit::Failure;
    };

    let Some(task) = registry.get(&args.task) else {
        error!("{}", TaskwatchError::TaskNotFound(args.task.clone()));
        error!("Registered tasks:\r\n  {}", registry.names().join("\r\n  "));
        return Exit::Failure;
    };

    debug!(task = %task.name(), watch = args.watch, "running requested task");

    let outcome = tokio::select! {
        res = task.run_with_args(&args.args) => res,
        Some(fatal) = fatal_rx.recv() => {
            debug!(%fatal, "fatal condition during initial run");
            return Exit::Failure;
        }
    };

    if let Err(err) = outcome {
        // Tagged errors were already logged by the runner that produced them.
        if !err.is_propagated() {
            error!("{err:?}");
        }
        return Exit::Failure;
    }

    if !args.watch {
        return Exit::Success;
    }

    match watch_all(&registry) {
        Ok(count) => debug!(count, "watch loops activated"),
        Err(err) => {
            error!("{err}");
            return Exit::Failure;
        }
    }

    // The registry stays alive here so the fatal channel never closes.
    let exit = supervise(&mut fatal_rx).await;
    drop(registry);
    exit
}

/// Activate watch mode for every task that has run, declares a watch option
/// and is not watched yet.
///
/// Returns the number of watch loops started; zero is an error.
pub fn watch_all(registry: &Registry) -> Result<usize> {
    let mut activated = 0;

    for task in registry.tasks() {
        if !task.ran_at_least_once() {
            continue;
        }
        if !task.can_watch() || task.is_watching() {
            continue;
        }
        if watch::activate(task)? {
            activated += 1;
        }
    }

    if activated == 0 {
        return Err(TaskwatchError::NothingToWatch);
    }
    Ok(activated)
}

async fn supervise(fatal_rx: &mut FatalReceiver) -> Exit {
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        fatal = fatal_rx.recv() => {
            match fatal {
                Some(fatal) => debug!(%fatal, "fatal condition in watch mode"),
                None => warn!("fatal channel closed while watching"),
            }
            Exit::Failure
        }
        _ = interrupted => {
            info!("interrupted; stopping watch");
            Exit::Interrupted
        }
    }
}
