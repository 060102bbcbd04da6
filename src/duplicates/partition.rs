//! Byte-equality partitioning of one size group.
//!
//! # Overview
//!
//! [`ClusterIter`] splits a list of same-sized files into maximal clusters of
//! byte-identical files. The first pending file becomes the pivot, every
//! later pending file is compared with it, matches join the pivot's cluster
//! and are never compared again. A pivot with no match is unique and is not
//! reported. This costs O(k²) comparisons in the worst case for a group of
//! k files, which stays small because k only counts files of one exact size.
//!
//! Files live in a fixed arena; each one has a [`Slot`] state instead of
//! being removed from a list while it is iterated.
//!
//! # Comparison failures
//!
//! A [`ComparisonError`] is yielded in place of a cluster. The unreadable
//! file is marked [`Slot::Skipped`] and never compared again. If the pivot
//! itself became unreadable, the files already matched against it go back
//! to pending and get a new pivot. Callers that keep iterating get
//! skip-and-continue behavior; callers that stop at the first error abort.
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::duplicates::partition_group;
//! use distinctpics::scanner::FileRecord;
//!
//! let files = vec![
//!     FileRecord::new("/photos/a.jpg", 10),
//!     FileRecord::new("/photos/b.jpg", 10),
//! ];
//! for result in partition_group(files) {
//!     match result {
//!         Ok(cluster) => println!("{} identical files", cluster.len()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::compare::{are_byte_identical, ComparisonError};
use super::groups::DuplicateCluster;
use crate::scanner::FileRecord;

/// Per-file bookkeeping inside one partitioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Not yet assigned
    Pending,
    /// Member of a reported cluster
    Clustered,
    /// Matched no other file
    Unique,
    /// Could not be read; excluded from further comparison
    Skipped,
}

/// Signature of the pairwise comparison used by the partitioner.
pub type CompareFn = fn(&Path, &Path) -> Result<bool, ComparisonError>;

/// Lazy iterator over the duplicate clusters of one size group.
pub struct ClusterIter<F = CompareFn> {
    size: u64,
    files: Vec<FileRecord>,
    slots: Vec<Slot>,
    compare: F,
    /// Pivot currently being scanned, if any
    pivot: Option<usize>,
    /// Next index to compare against the pivot
    cursor: usize,
    /// Lowest index that can still be a pivot
    next_pivot: usize,
    /// Indices matched to the current pivot (pivot first)
    members: Vec<usize>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    interrupted: bool,
    comparisons: usize,
}

impl<F> std::fmt::Debug for ClusterIter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterIter")
            .field("size", &self.size)
            .field("files", &self.files.len())
            .field("slots", &self.slots)
            .field("pivot", &self.pivot)
            .field("interrupted", &self.interrupted)
            .field("comparisons", &self.comparisons)
            .finish()
    }
}

/// Partition same-sized files into clusters using full byte comparison.
#[must_use]
pub fn partition_group(files: Vec<FileRecord>) -> ClusterIter {
    ClusterIter::with_comparator(files, are_byte_identical as CompareFn)
}

impl<F> ClusterIter<F>
where
    F: FnMut(&Path, &Path) -> Result<bool, ComparisonError>,
{
    /// Partition with a custom pairwise comparison.
    #[must_use]
    pub fn with_comparator(files: Vec<FileRecord>, compare: F) -> Self {
        let size = files.first().map_or(0, |f| f.size);
        debug_assert!(
            files.iter().all(|f| f.size == size),
            "all files in a size group must share one size"
        );
        Self {
            size,
            slots: vec![Slot::Pending; files.len()],
            files,
            compare,
            pivot: None,
            cursor: 0,
            next_pivot: 0,
            members: Vec::new(),
            shutdown_flag: None,
            interrupted: false,
            comparisons: 0,
        }
    }

    /// Stop between comparisons once the flag is raised.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Whether iteration ended because of the shutdown flag.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Number of pairwise comparisons performed so far.
    #[must_use]
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    /// Current state of every input file, in input order.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Files excluded because they could not be read.
    pub fn skipped(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.files_in(Slot::Skipped)
    }

    /// Files confirmed to match no other file.
    pub fn unique(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.files_in(Slot::Unique)
    }

    fn files_in(&self, state: Slot) -> impl Iterator<Item = &FileRecord> + '_ {
        self.files
            .iter()
            .zip(&self.slots)
            .filter(move |(_, slot)| **slot == state)
            .map(|(file, _)| file)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Pick the next pending file as pivot.
    fn start_pivot(&mut self) -> Option<usize> {
        let index = (self.next_pivot..self.slots.len()).find(|&i| self.slots[i] == Slot::Pending)?;
        self.pivot = Some(index);
        self.cursor = index + 1;
        self.next_pivot = index + 1;
        self.members.clear();
        self.members.push(index);
        Some(index)
    }

    /// Record a comparison failure and decide which file is dropped.
    fn fail(&mut self, pivot: usize, candidate: usize, error: &ComparisonError) {
        if error.unreadable == self.files[candidate].path {
            log::warn!(
                "Skipping unreadable file {}",
                self.files[candidate].path.display()
            );
            self.slots[candidate] = Slot::Skipped;
        } else {
            log::warn!(
                "Skipping unreadable file {}",
                self.files[pivot].path.display()
            );
            self.slots[pivot] = Slot::Skipped;
            for &member in &self.members[1..] {
                self.slots[member] = Slot::Pending;
            }
            self.members.clear();
            self.pivot = None;
        }
    }
}

impl<F> Iterator for ClusterIter<F>
where
    F: FnMut(&Path, &Path) -> Result<bool, ComparisonError>,
{
    type Item = Result<DuplicateCluster, ComparisonError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.interrupted {
                return None;
            }

            let pivot = match self.pivot {
                Some(pivot) => pivot,
                None => self.start_pivot()?,
            };

            while self.cursor < self.files.len() {
                let candidate = self.cursor;
                self.cursor += 1;

                if self.slots[candidate] != Slot::Pending {
                    continue;
                }
                if self.is_shutdown_requested() {
                    log::debug!("Partition: Shutdown requested, stopping");
                    self.interrupted = true;
                    return None;
                }

                self.comparisons += 1;
                let result = (self.compare)(&self.files[pivot].path, &self.files[candidate].path);
                match result {
                    Ok(true) => {
                        self.slots[candidate] = Slot::Clustered;
                        self.members.push(candidate);
                    }
                    Ok(false) => {}
                    Err(e) => {
                        self.fail(pivot, candidate, &e);
                        return Some(Err(e));
                    }
                }
            }

            self.pivot = None;
            if self.members.len() > 1 {
                self.slots[pivot] = Slot::Clustered;
                let files = self
                    .members
                    .drain(..)
                    .map(|i| self.files[i].clone())
                    .collect();
                return Some(Ok(DuplicateCluster::new(self.size, files)));
            }

            log::trace!("Unique file: {}", self.files[pivot].path.display());
            self.slots[pivot] = Slot::Unique;
        }
    }
}
