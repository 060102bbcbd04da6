//! Duplicate finder orchestrating the detection pipeline.
//!
//! # Overview
//!
//! 1. **Walk** - Collect every regular file under the root
//! 2. **Size grouping** - Group files by exact size (see [`crate::duplicates::groups`])
//! 3. **Partitioning** - Split each size group with 2+ files into clusters of
//!    byte-identical files (see [`crate::duplicates::partition`])
//!
//! Size groups touch disjoint files, so step 3 runs them in parallel on a
//! rayon pool bounded by `io_threads`. Each group is partitioned
//! sequentially; a comparison error in one group never affects another.
//! The final list is sorted by size, then by path, so it does not depend on
//! which worker finished first.
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (clusters, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! for cluster in &clusters {
//!     for path in cluster.paths() {
//!         println!("{}", path.display());
//!     }
//!     println!();
//! }
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::compare::ComparisonError;
use super::groups::{candidate_groups, group_records, DuplicateCluster, SizeGroup};
use super::partition::partition_group;
use crate::progress::ProgressCallback;
use crate::scanner::{FileRecord, ScanError, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of worker threads comparing size groups.
    /// Default is 4 to keep open file descriptors and disk seeks bounded.
    pub io_threads: usize,
    /// Walker configuration (error policy for unreadable directories).
    pub walker_config: WalkerConfig,
    /// Fail the scan on the first comparison error instead of skipping the file.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            strict: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of worker threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Abort on the first comparison error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of size groups that were partitioned
    pub candidate_groups: usize,
    /// Number of pairwise byte comparisons performed
    pub comparisons: usize,
    /// Number of duplicate clusters found
    pub duplicate_clusters: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Paths skipped by the walker under the skip policy
    pub skipped_paths: Vec<ScanError>,
    /// Comparison errors; the unreadable files were left out of all clusters
    pub comparison_errors: Vec<ComparisonError>,
}

impl ScanSummary {
    /// Whether any path was skipped or any comparison failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.skipped_paths.is_empty() || !self.comparison_errors.is_empty()
    }

    /// Percentage of scanned bytes taken by duplicate copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The tree walk failed.
    #[error(transparent)]
    Scan(ScanError),

    /// A comparison failed in strict mode.
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}

impl From<ScanError> for FinderError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Interrupted => Self::Interrupted,
            other => Self::Scan(other),
        }
    }
}

/// Outcome of partitioning one size group.
#[derive(Debug, Default)]
struct GroupOutcome {
    clusters: Vec<DuplicateCluster>,
    errors: Vec<ComparisonError>,
    comparisons: usize,
    interrupted: bool,
}

/// Duplicate finder that runs the walk, size grouping and partitioning.
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all clusters of byte-identical files under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - A directory cannot be read under the abort policy
    /// - A comparison fails in strict mode
    /// - The scan is interrupted by the shutdown flag
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateCluster>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!("Starting duplicate scan of {}", path.display());

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let outcome = walker.collect()?;
        let (clusters, mut summary) = self.find_duplicates_from_records(outcome.records)?;
        summary.skipped_paths = outcome.skipped;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate clusters, {} duplicate files, {} reclaimable",
            summary.duplicate_clusters,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((clusters, summary))
    }

    /// Find duplicates among already collected file records.
    ///
    /// # Errors
    ///
    /// [`FinderError::Comparison`] in strict mode, [`FinderError::Interrupted`]
    /// if the shutdown flag was raised.
    pub fn find_duplicates_from_records(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateCluster>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        let (groups, stats) = group_records(files);
        let mut summary = ScanSummary {
            total_files: stats.total_files,
            total_size: stats.total_size,
            eliminated_by_size: stats.singleton_files,
            candidate_groups: stats.candidate_groups,
            ..Default::default()
        };

        log::info!(
            "Size grouping: {} files ({}) -> {} candidate groups ({:.1}% eliminated)",
            stats.total_files,
            summary.total_size_display(),
            stats.candidate_groups,
            stats.elimination_rate()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let candidates = candidate_groups(groups);
        let outcomes = self.partition_all(candidates);

        let mut clusters = Vec::new();
        let mut interrupted = false;
        for outcome in outcomes {
            summary.comparisons += outcome.comparisons;
            interrupted |= outcome.interrupted;
            clusters.extend(outcome.clusters);
            summary.comparison_errors.extend(outcome.errors);
        }

        if interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if self.config.strict && !summary.comparison_errors.is_empty() {
            let first = summary.comparison_errors.remove(0);
            return Err(FinderError::Comparison(first));
        }

        for cluster in &mut clusters {
            cluster.sort();
        }
        clusters.sort_by(|a, b| {
            a.size
                .cmp(&b.size)
                .then_with(|| a.files[0].path.cmp(&b.files[0].path))
        });

        summary.duplicate_clusters = clusters.len();
        summary.duplicate_files = clusters.iter().map(DuplicateCluster::duplicate_count).sum();
        summary.reclaimable_space = clusters.iter().map(DuplicateCluster::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        Ok((clusters, summary))
    }

    /// Partition every candidate group on the bounded worker pool.
    fn partition_all(&self, candidates: Vec<SizeGroup>) -> Vec<GroupOutcome> {
        if candidates.is_empty() {
            log::info!("No size group has more than one file, nothing to compare");
            return Vec::new();
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("comparing", candidates.len());
        }

        let done = AtomicUsize::new(0);
        let work = || {
            candidates
                .into_par_iter()
                .map(|group| {
                    let outcome = self.partition_one(group);
                    let current = done.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(ref callback) = self.config.progress_callback {
                        let label = outcome
                            .clusters
                            .first()
                            .map(|c| c.files[0].path.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        callback.on_progress(current, &label);
                    }
                    outcome
                })
                .collect::<Vec<_>>()
        };

        let outcomes = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log::warn!(
                    "Failed to create custom thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                work()
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("comparing");
        }

        outcomes
    }

    /// Partition one size group sequentially.
    fn partition_one(&self, group: SizeGroup) -> GroupOutcome {
        let mut outcome = GroupOutcome::default();

        if self.config.is_shutdown_requested() {
            outcome.interrupted = true;
            return outcome;
        }

        log::debug!(
            "Comparing {} files of {} bytes",
            group.files.len(),
            group.size
        );

        let mut iter = partition_group(group.files);
        if let Some(ref flag) = self.config.shutdown_flag {
            iter = iter.with_shutdown_flag(flag.clone());
        }

        for result in iter.by_ref() {
            match result {
                Ok(cluster) => {
                    log::debug!(
                        "Cluster of {} identical files ({} bytes each)",
                        cluster.len(),
                        cluster.size
                    );
                    outcome.clusters.push(cluster);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    outcome.errors.push(e);
                    if self.config.strict {
                        break;
                    }
                }
            }
        }

        outcome.comparisons = iter.comparisons();
        outcome.interrupted = iter.is_interrupted();
        outcome
    }
}

/// Find all duplicate clusters under `root` with the default configuration.
///
/// Unreadable directories abort the scan. Files that become unreadable
/// during comparison are left out of every cluster and only logged here;
/// use [`DuplicateFinder::find_duplicates`] to get them back through
/// [`ScanSummary::comparison_errors`].
///
/// # Errors
///
/// See [`DuplicateFinder::find_duplicates`].
pub fn find_duplicate_clusters(root: &Path) -> Result<Vec<DuplicateCluster>, FinderError> {
    DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .map(|(clusters, _)| clusters)
}

/// Get paths from a list of clusters, one vector per cluster.
#[must_use]
pub fn cluster_paths(clusters: &[DuplicateCluster]) -> Vec<Vec<PathBuf>> {
    clusters.iter().map(DuplicateCluster::paths).collect()
}
