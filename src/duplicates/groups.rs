//! Size grouping and duplicate cluster types.
//!
//! # Overview
//!
//! Size grouping is the cheap pre-filter of duplicate detection: files with
//! different sizes cannot be byte-identical, so only files sharing an exact
//! size are ever compared by content.
//!
//! # Example
//!
//! ```
//! use distinctpics::scanner::FileRecord;
//! use distinctpics::duplicates::group_records;
//!
//! let files = vec![
//!     FileRecord::new("/file1.txt", 1024),
//!     FileRecord::new("/file2.txt", 1024),
//!     FileRecord::new("/file3.txt", 2048),
//! ];
//!
//! let (groups, stats) = group_records(files);
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups[&1024].len(), 2);
//! assert_eq!(stats.candidate_files, 2);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scanner::{FileRecord, ScanError, Walker, WalkerConfig};

/// Files keyed by their exact size in bytes.
///
/// Within one size, files keep the order the walk discovered them in.
pub type SizeGroups = HashMap<u64, Vec<FileRecord>>;

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRecord>,
}

impl SizeGroup {
    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// A maximal set of mutually byte-identical files.
///
/// Clusters reported to callers always hold at least two files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// The identical files; the first one is treated as the original
    pub files: Vec<FileRecord>,
}

impl DuplicateCluster {
    /// Create a new cluster.
    #[must_use]
    pub fn new(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this cluster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this cluster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space taken by the copies beyond the first.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Get just the paths of files in this cluster.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Check whether the cluster contains the given path.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// Sort member files by path so reports are stable.
    pub fn sort(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of size groups with 2+ files
    pub candidate_groups: usize,
    /// Number of files in size groups with 2+ files
    pub candidate_files: usize,
    /// Number of files alone in their size group
    pub singleton_files: usize,
    /// Number of empty files (size 0); they are grouped like any other size
    pub empty_files: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.singleton_files as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group file records by exact size.
///
/// Every record lands in exactly one group; singleton groups are kept so
/// the mapping covers the whole input. No file I/O is performed.
#[must_use]
pub fn group_records(files: impl IntoIterator<Item = FileRecord>) -> (SizeGroups, GroupingStats) {
    let mut groups = SizeGroups::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }
        groups.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = groups.len();
    for files in groups.values() {
        if files.len() > 1 {
            stats.candidate_groups += 1;
            stats.candidate_files += files.len();
        } else {
            stats.singleton_files += 1;
        }
    }

    log::debug!(
        "Grouped {} files into {} sizes ({} candidate groups)",
        stats.total_files,
        stats.unique_sizes,
        stats.candidate_groups
    );

    (groups, stats)
}

/// Keep only groups that can contain duplicates, ordered by size.
#[must_use]
pub fn candidate_groups(groups: SizeGroups) -> Vec<SizeGroup> {
    let mut candidates: Vec<SizeGroup> = groups
        .into_iter()
        .filter(|(size, files)| {
            if files.len() > 1 {
                true
            } else {
                log::trace!("Eliminated unique size {}", size);
                false
            }
        })
        .map(|(size, files)| SizeGroup::with_files(size, files))
        .collect();
    candidates.sort_by_key(|g| g.size);
    candidates
}

/// Walk `root` recursively and group every regular file by size.
///
/// Uses the default [`WalkErrorPolicy::Abort`](crate::scanner::WalkErrorPolicy::Abort):
/// the first unreadable directory fails the whole scan.
///
/// # Errors
///
/// [`ScanError::NotFound`] if `root` does not exist, [`ScanError::Access`]
/// if a subdirectory cannot be listed.
pub fn group_by_size(root: &Path) -> Result<SizeGroups, ScanError> {
    group_by_size_with(root, &WalkerConfig::default())
}

/// Like [`group_by_size`] with an explicit walker configuration.
///
/// Under [`WalkErrorPolicy::Skip`](crate::scanner::WalkErrorPolicy::Skip)
/// unreadable paths are logged and left out of the result.
///
/// # Errors
///
/// See [`group_by_size`].
pub fn group_by_size_with(root: &Path, config: &WalkerConfig) -> Result<SizeGroups, ScanError> {
    let outcome = Walker::new(root, config.clone()).collect()?;
    let (groups, _) = group_records(outcome.records);
    Ok(groups)
}
