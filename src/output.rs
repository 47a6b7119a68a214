//! Writing artifacts under the output directory.
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{GenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Same bytes already on disk.
    Unchanged,
    /// Exists and `replace` is off.
    Kept,
}

/// The output directory. Paths passed in are relative to it.
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
    replace: bool,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>, replace: bool) -> Self {
        Self { root: root.into(), replace }
    }

    pub fn path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, relative: &Path) -> bool {
        self.path(relative).exists()
    }

    pub fn read(&self, relative: &Path) -> Result<String> {
        let path = self.path(relative);
        std::fs::read_to_string(&path).map_err(|source| GenError::Read { path, source })
    }

    pub fn create_dir(&self, relative: &Path) -> Result<()> {
        let path = self.path(relative);
        std::fs::create_dir_all(&path).map_err(|source| GenError::CreateDir { path, source })
    }

    pub fn write(&self, relative: &Path, contents: &str) -> Result<WriteOutcome> {
        if self.exists(relative) {
            if !self.replace {
                debug!(path = %relative.display(), "exists, not replacing");
                return Ok(WriteOutcome::Kept);
            }
            if self.read(relative)? == contents {
                return Ok(WriteOutcome::Unchanged);
            }
        }
        if let Some(parent) = relative.parent() {
            self.create_dir(parent)?;
        }
        let path = self.path(relative);
        std::fs::write(&path, contents).map_err(|source| GenError::Write { path, source })?;
        Ok(WriteOutcome::Written)
    }
}

/// Post-processing for written Rust files.
pub trait Formatter {
    fn format(&self, files: &[PathBuf]) -> std::result::Result<(), String>;
}

/// Runs `rustfmt` once over a batch of files.
#[derive(Debug, Clone)]
pub struct Rustfmt {
    pub edition: String,
}

impl Formatter for Rustfmt {
    fn format(&self, files: &[PathBuf]) -> std::result::Result<(), String> {
        if files.is_empty() {
            return Ok(());
        }
        let output = Command::new("rustfmt")
            .arg("--edition")
            .arg(&self.edition)
            .args(files)
            .output()
            .map_err(|err| format!("failed to run rustfmt: {err}"))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(format!(
                "rustfmt exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}
