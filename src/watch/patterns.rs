// src/watch/patterns.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// A directory handed to the OS watcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WatchRoot {
    pub dir: PathBuf,
    pub recursive: bool,
}

/// Compiled input patterns of a single task.
///
/// Patterns are relative to the working directory (a leading `./` is
/// ignored). `*` does not cross directory separators; `**` does.
#[derive(Clone)]
pub struct InputPatterns {
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for InputPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputPatterns")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl InputPatterns {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            bail!("no input patterns given");
        }

        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| normalize(p.as_ref()).to_string())
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pat in &patterns {
            let glob = GlobBuilder::new(pat)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern: {pat}"))?;
            builder.add(glob);
        }
        let set = builder.build().context("building input globset")?;

        Ok(Self { patterns, set })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if `path` (relative to the working directory, forward
    /// slashes) is one of this task's inputs.
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(normalize(path))
    }

    /// Directories that must be watched to observe every input.
    ///
    /// Glob patterns are watched recursively from their literal prefix;
    /// literal files are watched through their parent directory so that
    /// editors replacing the file are still seen.
    pub fn watch_roots(&self) -> Vec<WatchRoot> {
        let mut roots: Vec<WatchRoot> = self.patterns.iter().map(|p| watch_root(p)).collect();
        roots.sort();
        roots.dedup();
        roots
    }
}

fn normalize(pattern: &str) -> &str {
    pattern.strip_prefix("./").unwrap_or(pattern)
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

fn watch_root(pattern: &str) -> WatchRoot {
    let mut dir = PathBuf::new();
    let mut components = Path::new(pattern).components().peekable();

    while let Some(component) = components.next() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                if has_glob_meta(&part) {
                    return WatchRoot {
                        dir: non_empty(dir),
                        recursive: true,
                    };
                }
                // The last literal component is the file itself.
                if components.peek().is_none() {
                    break;
                }
                dir.push(part.as_ref());
            }
            Component::CurDir => {}
            other => dir.push(other.as_os_str()),
        }
    }

    WatchRoot {
        dir: non_empty(dir),
        recursive: false,
    }
}

fn non_empty(dir: PathBuf) -> PathBuf {
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    }
}
