//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping ([`groups`])
//! - Full-content byte comparison ([`compare`])
//! - Byte-equality partitioning of a size group ([`partition`])
//! - The end-to-end pipeline ([`finder`])

pub mod compare;
pub mod finder;
pub mod groups;
pub mod partition;

pub use compare::{are_byte_identical, ComparisonError};
pub use finder::{
    cluster_paths, find_duplicate_clusters, DuplicateFinder, FinderConfig, FinderError,
    ScanSummary,
};
pub use groups::{
    candidate_groups, group_by_size, group_by_size_with, group_records, DuplicateCluster,
    GroupingStats, SizeGroup, SizeGroups,
};
pub use partition::{partition_group, ClusterIter, CompareFn, Slot};
