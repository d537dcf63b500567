//! Write-only locations for diagnostic artifacts

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::Result;

/// A directory that steps may write metrics and figures into
///
/// Directories are created on first write only, so handing out scopes is free.
/// Nothing in the crate reads these artifacts back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticScope {
    path: PathBuf,
}

impl DiagnosticScope {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nested scope `self/name`
    pub fn child(&self, name: impl AsRef<str>) -> Self {
        Self {
            path: self.path.join(name.as_ref()),
        }
    }

    /// Nested scope named after the current local time plus a random suffix,
    /// so that repeated runs never share a directory
    pub fn timestamped_child(&self) -> Self {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        self.child(format!("{}_{}", stamp, uuid::Uuid::new_v4()))
    }

    /// Serialize `value` as pretty JSON into `file_name`
    pub fn write_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let contents = serde_json::to_string_pretty(value)?;
        self.write_text(file_name, &contents)
    }

    /// Write raw text into `file_name`
    pub fn write_text(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.path)?;
        let target = self.path.join(file_name);
        fs::write(&target, contents)?;
        tracing::debug!(path = %target.display(), "diagnostic artifact written");
        Ok(target)
    }
}
