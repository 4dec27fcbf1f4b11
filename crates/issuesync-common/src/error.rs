//! Common error types used throughout issuesync.
//!
//! This module provides a unified error type for the failures that can happen
//! while turning archive member names into destination paths.

use std::path::PathBuf;

/// Common error type for issuesync.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A destination path does not have the `<NN>-<section>/<track>-<article>.mp3` shape.
    #[error("Invalid destination path: {}", path.display())]
    InvalidDestination { path: PathBuf },

    /// Two jobs would write the same destination file.
    #[error("Duplicate destination path: {}", path.display())]
    DuplicateDestination { path: PathBuf },

    /// A section directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new InvalidDestination error.
    pub fn invalid_destination(path: impl Into<PathBuf>) -> Self {
        Self::InvalidDestination { path: path.into() }
    }

    /// Create a new DuplicateDestination error.
    pub fn duplicate_destination(path: impl Into<PathBuf>) -> Self {
        Self::DuplicateDestination { path: path.into() }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
