//! Duplicate removal via the system trash or permanent deletion.
//!
//! # Overview
//!
//! For every cluster the first file (after sorting by path) is kept and the
//! remaining copies are removed. Removal can:
//! - Move files to the system trash (default, recoverable)
//! - Delete permanently (`DeleteMode::Permanent`)
//! - Only report what would happen (`dry_run`)
//!
//! A file whose size no longer matches the size seen during the scan is
//! left alone and reported as modified.
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::actions::{delete_duplicates, DeleteConfig};
//! use distinctpics::duplicates::find_duplicate_clusters;
//! use std::path::Path;
//!
//! let clusters = find_duplicate_clusters(Path::new("photos")).unwrap();
//! let result = delete_duplicates(&clusters, &DeleteConfig::trash().with_dry_run(true));
//! println!("{}", result.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::DuplicateCluster;
use crate::scanner::FileRecord;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed between the scan and the deletion.
    #[error("file modified since scan: {path} (size {expected} -> {actual})")]
    Modified {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {source}")]
    PermanentDeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The selection would remove every copy of a cluster.
    #[error("cannot delete all copies - at least one file must be preserved")]
    AllCopiesWouldBeDeleted,

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted => None,
        }
    }

    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// How duplicates are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Move to the system trash.
    #[default]
    Trash,
    /// Remove from disk.
    Permanent,
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Trash or permanent removal.
    pub mode: DeleteMode,
    /// Report only; no file is touched.
    pub dry_run: bool,
}

impl DeleteConfig {
    /// Config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            mode: DeleteMode::Permanent,
            dry_run: false,
        }
    }

    /// Enable or disable dry-run.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A file that was (or, in a dry run, would have been) removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    /// Removed path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// How it was removed.
    pub mode: DeleteMode,
    /// Whether this was only simulated.
    pub dry_run: bool,
}

/// Results of removing duplicates from a set of clusters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDeleteResult {
    /// Files kept, one per cluster.
    pub kept: Vec<PathBuf>,
    /// Removed files.
    pub successes: Vec<DeleteResult>,
    /// Failed removals with their error messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed (or that would be freed).
    pub bytes_freed: u64,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        let freed = ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("{verb} {} file(s), {freed} freed", self.success_count())
        } else {
            format!(
                "{verb} {} file(s), {} failed, {freed} freed",
                self.success_count(),
                self.failure_count()
            )
        }
    }
}

/// Remove one duplicate copy.
///
/// The file must still have the size recorded during the scan.
///
/// # Errors
///
/// - `NotFound` / `PermissionDenied` / `Io` if the file cannot be inspected
/// - `Modified` if its size changed since the scan
/// - `TrashFailed` / `PermanentDeleteFailed` if removal fails
pub fn delete_file(record: &FileRecord, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    let path = record.path.as_path();
    let actual = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();
    if actual != record.size {
        log::warn!("File modified since scan: {}", path.display());
        return Err(DeleteError::Modified {
            path: path.to_path_buf(),
            expected: record.size,
            actual,
        });
    }

    let result = DeleteResult {
        path: path.to_path_buf(),
        size: actual,
        mode: config.mode,
        dry_run: config.dry_run,
    };

    if config.dry_run {
        log::info!("Would delete: {} ({} bytes)", path.display(), actual);
        return Ok(result);
    }

    match config.mode {
        DeleteMode::Trash => {
            trash::delete(path).map_err(|e| {
                log::error!("Trash operation failed for {}: {}", path.display(), e);
                DeleteError::TrashFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            log::info!("Moved to trash: {} ({} bytes)", path.display(), actual);
        }
        DeleteMode::Permanent => {
            fs::remove_file(path).map_err(|e| {
                log::error!("Permanent delete failed for {}: {}", path.display(), e);
                DeleteError::PermanentDeleteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
            log::info!("Permanently deleted: {} ({} bytes)", path.display(), actual);
        }
    }

    Ok(result)
}

/// Validate that a selection doesn't delete all copies.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` if no path of the cluster remains.
///
/// # Example
///
/// ```
/// use distinctpics::actions::validate_preserves_copy;
/// use std::path::PathBuf;
///
/// let cluster = vec![PathBuf::from("/a.jpg"), PathBuf::from("/b.jpg")];
/// assert!(validate_preserves_copy(&cluster[1..], &cluster).is_ok());
/// assert!(validate_preserves_copy(&cluster, &cluster).is_err());
/// ```
pub fn validate_preserves_copy(
    selected_paths: &[PathBuf],
    cluster_paths: &[PathBuf],
) -> Result<(), DeleteError> {
    let selected: HashSet<&PathBuf> = selected_paths.iter().collect();
    let preserved = cluster_paths
        .iter()
        .filter(|p| !selected.contains(p))
        .count();

    if preserved == 0 {
        log::error!(
            "Attempted to delete all {} copies of a cluster",
            cluster_paths.len()
        );
        Err(DeleteError::AllCopiesWouldBeDeleted)
    } else {
        Ok(())
    }
}

/// Remove every copy except the first file of each cluster.
///
/// A failure on one file is recorded and the batch continues.
#[must_use]
pub fn delete_duplicates(clusters: &[DuplicateCluster], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult {
        dry_run: config.dry_run,
        ..Default::default()
    };

    for cluster in clusters {
        let Some((keep, copies)) = cluster.files.split_first() else {
            continue;
        };

        let all = cluster.paths();
        if let Err(e) = validate_preserves_copy(&all[1..], &all) {
            result.failures.push((keep.path.clone(), e.to_string()));
            continue;
        }

        log::debug!("Keeping {}", keep.path.display());
        result.kept.push(keep.path.clone());

        for copy in copies {
            match delete_file(copy, config) {
                Ok(deleted) => {
                    result.bytes_freed += deleted.size;
                    result.successes.push(deleted);
                }
                Err(e) => {
                    log::warn!("Failed to delete {}: {}", copy.path.display(), e);
                    result.failures.push((copy.path.clone(), e.to_string()));
                }
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
