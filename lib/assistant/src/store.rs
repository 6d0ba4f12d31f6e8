//! Durable key-value configuration.
//!
//! The registry writes the assistant id here once so later process starts
//! pick it up from the environment instead of creating a new assistant.

use crate::error::StoreError;
use concierge_core::Result;
use std::path::{Path, PathBuf};

/// A durable key-value store the registry can write back to.
pub trait ConfigStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// A `.env` file store.
///
/// An existing `KEY=...` line is rewritten in place; otherwise the entry is
/// appended. The file is created if it does not exist. Values are written
/// single-quoted.
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: &std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

/// Returns true if `line` assigns `key`, allowing a leading `export`.
fn assigns_key(line: &str, key: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

impl ConfigStore for EnvFileStore {
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let existing = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(self.io_error(&e).into()),
        };

        let entry = format!("{key}='{}'", value.replace('\'', "\\'"));
        let mut replaced = false;
        let mut lines: Vec<String> = existing
            .lines()
            .map(|line| {
                if !replaced && assigns_key(line, key) {
                    replaced = true;
                    entry.clone()
                } else {
                    line.to_string()
                }
            })
            .collect();
        if !replaced {
            lines.push(entry);
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents).map_err(|e| self.io_error(&e))?;
        Ok(())
    }
}
