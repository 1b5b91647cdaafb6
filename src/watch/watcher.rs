// src/watch/watcher.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::watch::debounce::Debouncer;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::InputPatterns;

/// Debounce window applied to filesystem notifications.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// What happened to a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Changed,
    Deleted,
    Renamed,
}

impl ChangeKind {
    /// Map a raw `notify` event kind; access and unknown events are dropped.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(ChangeKind::Added),
            EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Renamed),
            EventKind::Modify(_) | EventKind::Any => Some(ChangeKind::Changed),
            EventKind::Remove(_) => Some(ChangeKind::Deleted),
            EventKind::Access(_) | EventKind::Other => None,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Changed => "changed",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
        };
        f.write_str(s)
    }
}

/// A debounced change to one of a task's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

/// Item delivered to a watch loop: a change, or a failure of the
/// subscription itself.
pub type WatchNotification = std::result::Result<FileChange, notify::Error>;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops the
/// subscription and closes the notification stream.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Subscribe to changes of the files matching `patterns`.
///
/// - `root` is the directory patterns are relative to.
/// - `window` is the per-path debounce window.
///
/// Returns the handle and the stream of notifications. Watcher errors are
/// delivered on the same stream as `Err`. Fails if `root` is not an existing
/// directory or the subscription cannot be set up.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    patterns: InputPatterns,
    window: Duration,
) -> Result<(WatcherHandle, mpsc::UnboundedReceiver<WatchNotification>)> {
    let root = root.into();
    if !root.is_dir() {
        bail!("watch root {} is not a directory", root.display());
    }
    let root = root.canonicalize().unwrap_or(root);

    // Channel from the blocking notify callback into the async world.
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<WatchNotification>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // Fails only once the forwarder below has stopped.
            let _ = raw_tx.send(res);
        },
        Config::default(),
    )
    .context("creating filesystem watcher")?;

    for watch_root in patterns.watch_roots() {
        let dir = root.join(&watch_root.dir);
        if !dir.exists() {
            warn!(dir = %dir.display(), "input directory does not exist; not watching it");
            continue;
        }
        let mode = if watch_root.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&dir, mode)
            .with_context(|| format!("watching {}", dir.display()))?;
        debug!(dir = %dir.display(), recursive = watch_root.recursive, "watching directory");
    }

    info!(patterns = ?patterns.patterns(), "file watcher started on {:?}", root);

    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(window);

        while let Some(res) = raw_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    if out_tx.send(Err(err)).is_err() {
                        return;
                    }
                    continue;
                }
            };
            debug!(?event, "received notify event");

            let Some(kind) = ChangeKind::from_event_kind(&event.kind) else {
                continue;
            };

            for path in event.paths {
                if !is_input(&root, &path, &patterns) {
                    continue;
                }
                if !debouncer.admit(&path, Instant::now()) {
                    debug!(path = %path.display(), "debounced");
                    continue;
                }
                if out_tx.send(Ok(FileChange { kind, path })).is_err() {
                    debug!("watch loop gone; stopping notify forwarder");
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok((WatcherHandle { _inner: watcher }, out_rx))
}

fn is_input(root: &Path, path: &Path, patterns: &InputPatterns) -> bool {
    match relative_str(root, path) {
        Some(rel) => patterns.matches(&rel),
        None => patterns.matches(&path.to_string_lossy().replace('\\', "/")),
    }
}
