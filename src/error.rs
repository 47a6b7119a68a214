//! Error types for the generator.
//!
//! Only conditions that stop an endpoint (or the whole run) are errors.
//! Recoverable problems with samples are reported as
//! [`crate::generate::Warning`]s instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    // =========================================================================
    // FILE SYSTEM (fatal for the whole run)
    // =========================================================================
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    // =========================================================================
    // INPUTS
    // =========================================================================
    #[error("invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("bad input pattern `{pattern}`: {message}")]
    Glob { pattern: String, message: String },

    // =========================================================================
    // GENERATION (fatal for one endpoint)
    // =========================================================================
    /// Every disambiguation token was already taken for this candidate.
    #[error(
        "no free class name for `{candidate}` under `{parent}` (tried: {})",
        tried.join(", ")
    )]
    NamesExhausted {
        candidate: String,
        parent: String,
        tried: Vec<String>,
    },

    /// Response and entity trees built from the same sample disagree.
    #[error("response class `{response}` and entity class `{entity}` have different shapes")]
    ShapeMismatch { response: String, entity: String },
}

pub type Result<T> = std::result::Result<T, GenError>;

impl GenError {
    /// File-system failures abort the run; everything else fails at most one endpoint.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Read { .. }
                | Self::Write { .. }
                | Self::CreateDir { .. }
                | Self::Manifest { .. }
                | Self::Config { .. }
                | Self::Glob { .. }
        )
    }
}
