//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "clusters": [
//!     { "size": 1024, "files": ["/pics/a.jpg", "/pics/b.jpg"] }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "eliminated_by_size": 60,
//!     "candidate_groups": 12,
//!     "comparisons": 57,
//!     "duplicate_clusters": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "scan_duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "DP000"
//!   },
//!   "errors": [
//!     { "path": "/pics/locked.jpg", "message": "..." }
//!   ],
//!   "deletion": null
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::actions::BatchDeleteResult;
use crate::duplicates::{DuplicateCluster, ScanSummary};
use crate::error::ExitCode;

/// A duplicate cluster in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonCluster {
    /// File size in bytes
    pub size: u64,
    /// Paths of the identical files; the first is the one kept by `--delete`
    pub files: Vec<String>,
}

impl From<&DuplicateCluster> for JsonCluster {
    fn from(cluster: &DuplicateCluster) -> Self {
        Self {
            size: cluster.size,
            files: cluster
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub total_size: u64,
    pub eliminated_by_size: usize,
    pub candidate_groups: usize,
    pub comparisons: usize,
    pub duplicate_clusters: usize,
    pub duplicate_files: usize,
    pub reclaimable_space: u64,
    pub scan_duration_ms: u64,
    pub exit_code: i32,
    /// Machine-readable exit code name (e.g., "DP000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            candidate_groups: summary.candidate_groups,
            comparisons: summary.comparisons,
            duplicate_clusters: summary.duplicate_clusters,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A path that was skipped during the walk or a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    pub path: Option<String>,
    pub message: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub clusters: Vec<JsonCluster>,
    pub summary: JsonSummary,
    pub errors: Vec<JsonError>,
    /// Present when `--delete` ran.
    pub deletion: Option<BatchDeleteResult>,
}

impl JsonOutput {
    /// Build the report.
    ///
    /// ```
    /// use distinctpics::duplicates::ScanSummary;
    /// use distinctpics::error::ExitCode;
    /// use distinctpics::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates);
    /// assert!(output.clusters.is_empty());
    /// ```
    #[must_use]
    pub fn new(clusters: &[DuplicateCluster], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        let skipped = summary.skipped_paths.iter().map(|e| JsonError {
            path: e.path().map(|p| p.to_string_lossy().into_owned()),
            message: e.to_string(),
        });
        let unreadable = summary.comparison_errors.iter().map(|e| JsonError {
            path: Some(e.unreadable.to_string_lossy().into_owned()),
            message: e.to_string(),
        });

        Self {
            clusters: clusters.iter().map(JsonCluster::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            errors: skipped.chain(unreadable).collect(),
            deletion: None,
        }
    }

    /// Attach the outcome of a deletion run.
    #[must_use]
    pub fn with_deletion(mut self, deletion: BatchDeleteResult) -> Self {
        self.deletion = Some(deletion);
        self
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
