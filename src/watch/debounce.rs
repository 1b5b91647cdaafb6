// src/watch/debounce.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;

/// Entries older than the window are dropped once the map grows past this.
const PRUNE_THRESHOLD: usize = 1024;

/// Per-path leading-edge debounce.
///
/// The first event for a path passes; further events for the same path are
/// swallowed until `window` has elapsed since the last one that passed.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_emitted: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_emitted: HashMap::new(),
        }
    }

    /// Returns true if an event for `path` at `now` should be delivered.
    pub fn admit(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.last_emitted.get(path) {
            if now.saturating_duration_since(*last) < self.window {
                return false;
            }
        }

        if self.last_emitted.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            self.last_emitted
                .retain(|_, at| now.saturating_duration_since(*at) < window);
        }

        self.last_emitted.insert(path.to_path_buf(), now);
        true
    }
}
