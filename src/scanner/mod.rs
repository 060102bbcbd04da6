//! Scanner module for directory traversal.
//!
//! This module provides functionality for:
//! - Deterministic directory walking using jwalk
//! - Regular-file filtering (directories, symlinks, devices and sockets are excluded)
//! - An explicit policy for unreadable directories
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod walker;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use walker::{WalkOutcome, Walker};

/// A regular file discovered during the tree walk.
///
/// The size is captured once at scan time and never re-read. Identity is
/// the absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
}

impl FileRecord {
    /// Create a new FileRecord.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// What the walker does when a directory or file cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkErrorPolicy {
    /// Stop the whole scan at the first unreadable path.
    #[default]
    Abort,
    /// Skip the unreadable path (and its subtree), log a warning and continue.
    Skip,
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Policy for unreadable directories and files.
    pub error_policy: WalkErrorPolicy,
}

impl WalkerConfig {
    /// Create a new configuration with the given error policy.
    #[must_use]
    pub fn new(error_policy: WalkErrorPolicy) -> Self {
        Self { error_policy }
    }

    /// Configuration that skips unreadable paths instead of aborting.
    #[must_use]
    pub fn skipping() -> Self {
        Self::new(WalkErrorPolicy::Skip)
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory could not be listed or a file could not be inspected.
    #[error("Cannot access {path}: {source}")]
    Access {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The walk was cancelled through the shutdown flag.
    #[error("Scan interrupted")]
    Interrupted,
}

impl ScanError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::NotFound(p) | Self::NotADirectory(p) | Self::Access { path: p, .. } => Some(p),
            Self::Interrupted => None,
        }
    }
}
