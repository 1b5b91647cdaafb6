// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Read a Taskfile and deserialize it into a [`RawConfigFile`].
///
/// No semantic validation happens here; use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Deserialize Taskfile contents that are already in memory.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a Taskfile and validate it.
///
/// Checks that:
/// - at least one task is defined,
/// - each task has exactly one body (`cmd` or `steps`) and at most one watch
///   option,
/// - timeouts and watch globs parse,
/// - step references name existing tasks and form no cycle.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    ConfigFile::try_from(raw_config)
}
