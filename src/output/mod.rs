//! Output formatters for duplicate scan results.
//!
//! - Text: the paths of each cluster one per line, clusters separated by a
//!   blank line, followed by a summary
//! - JSON for automation and scripting ([`json`])
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::duplicates::DuplicateFinder;
//! use distinctpics::output::TextOutput;
//! use std::path::Path;
//!
//! let (clusters, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//! TextOutput::new(&clusters, &summary)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

pub mod json;

use std::io::{self, Write};

use crate::actions::BatchDeleteResult;
use crate::duplicates::{DuplicateCluster, ScanSummary};

pub use json::{JsonOutput, JsonOutputError};

/// Plain-text report.
pub struct TextOutput<'a> {
    clusters: &'a [DuplicateCluster],
    summary: &'a ScanSummary,
    deletion: Option<&'a BatchDeleteResult>,
    show_summary: bool,
}

impl<'a> TextOutput<'a> {
    /// Report for the given clusters and summary.
    #[must_use]
    pub fn new(clusters: &'a [DuplicateCluster], summary: &'a ScanSummary) -> Self {
        Self {
            clusters,
            summary,
            deletion: None,
            show_summary: true,
        }
    }

    /// Append the outcome of a deletion run.
    #[must_use]
    pub fn with_deletion(mut self, deletion: &'a BatchDeleteResult) -> Self {
        self.deletion = Some(deletion);
        self
    }

    /// Print only the clusters.
    #[must_use]
    pub fn paths_only(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for cluster in self.clusters {
            for file in &cluster.files {
                writeln!(writer, "{}", file.path.display())?;
            }
            writeln!(writer)?;
        }

        if !self.show_summary {
            return Ok(());
        }

        let summary = self.summary;
        writeln!(
            writer,
            "{} file(s) scanned ({}), {} duplicate cluster(s), {} redundant file(s), {} reclaimable",
            summary.total_files,
            summary.total_size_display(),
            summary.duplicate_clusters,
            summary.duplicate_files,
            summary.reclaimable_display()
        )?;

        let unreadable = summary.skipped_paths.len() + summary.comparison_errors.len();
        if unreadable > 0 {
            writeln!(writer, "{unreadable} path(s) could not be read and were left out")?;
        }

        if let Some(deletion) = self.deletion {
            writeln!(writer, "{}", deletion.summary())?;
            for (path, message) in &deletion.failures {
                writeln!(writer, "  failed: {} ({})", path.display(), message)?;
            }
        }

        Ok(())
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
