//! Photo sorter: files pictures into year and month folders.
//!
//! Every regular file under the source folder is moved (or copied) to
//! `<dest>/<YYYY>/<M> - <Mon>/<name>`, dated by the earlier of its
//! modification and creation times in local time.
//!
//! When a file with the same name is already at the destination:
//! - if it is byte-identical, the incoming file is skipped and left in place
//! - otherwise the incoming file is renamed `name (1).ext`, `name (2).ext`, ...
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::organize::{Organizer, TransferMode};
//! use std::path::Path;
//!
//! let organizer = Organizer::new(TransferMode::Copy);
//! let summary = organizer.run(Path::new("camera"), Path::new("pictures")).unwrap();
//! println!("{}", summary);
//! ```

pub mod naming;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use filetime::FileTime;
use serde::Serialize;

use crate::duplicates::{are_byte_identical, ComparisonError};
use crate::progress::ProgressCallback;
use crate::scanner::{ScanError, Walker, WalkerConfig};

pub use naming::{destination_for, file_time, local_time, month_folder, unique_name};

/// Errors from the photo sorter.
#[derive(thiserror::Error, Debug)]
pub enum OrganizeError {
    /// Source or destination is not an existing directory.
    #[error("Folder '{0}' is invalid or does not exist")]
    InvalidFolder(PathBuf),

    /// Source and destination resolve to the same directory.
    #[error("Source and destination folders cannot be the same: {0}")]
    SameFolder(PathBuf),

    /// The source walk failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Comparing with an existing destination file failed.
    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    /// A file had no usable timestamp.
    #[error("No modification or creation time for {0}")]
    NoTimestamp(PathBuf),

    /// Creating, copying or moving failed.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Interrupted by the shutdown flag.
    #[error("Sort interrupted by user")]
    Interrupted,
}

impl OrganizeError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Move files out of the source, or leave the source untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Move files (the default).
    #[default]
    Move,
    /// Copy files.
    Copy,
}

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Written to the given path.
    Transferred(PathBuf),
    /// An identical file already sits at the given path.
    Skipped(PathBuf),
}

/// Counters for a sort run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizeSummary {
    /// Files copied or moved.
    pub copied: usize,
    /// Files already present at the destination.
    pub skipped: usize,
    /// Files that could not be transferred, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl OrganizeSummary {
    /// Number of files looked at.
    #[must_use]
    pub fn total(&self) -> usize {
        self.copied + self.skipped + self.failed.len()
    }
}

impl fmt::Display for OrganizeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) total; {} copied; {} skipped",
            self.total(),
            self.copied,
            self.skipped
        )?;
        if !self.failed.is_empty() {
            write!(f, "; {} failed", self.failed.len())?;
        }
        Ok(())
    }
}

/// Sorts files into dated folders.
pub struct Organizer {
    mode: TransferMode,
    walker_config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl Organizer {
    /// Create an organizer with the given transfer mode.
    #[must_use]
    pub fn new(mode: TransferMode) -> Self {
        Self {
            mode,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the walker configuration used for the source folder.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
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

    /// The configured transfer mode.
    #[must_use]
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Sort every file under `source` into `dest`.
    ///
    /// Per-file failures are recorded in the summary and the run continues.
    /// Files already inside `dest` are left alone when `dest` lies within
    /// `source`.
    ///
    /// # Errors
    ///
    /// - `InvalidFolder` if either path is not an existing directory
    /// - `SameFolder` if both resolve to the same directory
    /// - `Scan` if the source walk fails under the abort policy
    /// - `Interrupted` if the shutdown flag is raised
    pub fn run(&self, source: &Path, dest: &Path) -> Result<OrganizeSummary, OrganizeError> {
        let (source, dest) = validate_folders(source, dest)?;
        log::info!(
            "{} files from {} to {}",
            match self.mode {
                TransferMode::Move => "Moving",
                TransferMode::Copy => "Copying",
            },
            source.display(),
            dest.display()
        );

        let mut walker = Walker::new(&source, self.walker_config.clone());
        if let Some(ref flag) = self.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }
        let outcome = walker.collect().map_err(|e| match e {
            ScanError::Interrupted => OrganizeError::Interrupted,
            other => OrganizeError::Scan(other),
        })?;

        let records: Vec<_> = outcome
            .records
            .into_iter()
            .filter(|r| !r.path.starts_with(&dest))
            .collect();

        let mut summary = OrganizeSummary::default();
        for skipped in outcome.skipped {
            let path = skipped.path().map(Path::to_path_buf).unwrap_or_default();
            summary.failed.push((path, skipped.to_string()));
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("sorting", records.len());
        }

        for (index, record) in records.iter().enumerate() {
            if self.is_shutdown_requested() {
                return Err(OrganizeError::Interrupted);
            }
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(index + 1, &record.path.to_string_lossy());
            }

            match self.sort_one(&record.path, &dest) {
                Ok(TransferOutcome::Transferred(_)) => summary.copied += 1,
                Ok(TransferOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    log::warn!("{}", e);
                    summary.failed.push((record.path.clone(), e.to_string()));
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("sorting");
        }

        log::info!("{}", summary);
        Ok(summary)
    }

    fn sort_one(&self, file: &Path, dest_root: &Path) -> Result<TransferOutcome, OrganizeError> {
        let metadata = fs::metadata(file).map_err(|e| OrganizeError::io(file, e))?;
        let time = file_time(&metadata)
            .ok_or_else(|| OrganizeError::NoTimestamp(file.to_path_buf()))?;
        let name = file
            .file_name()
            .ok_or_else(|| OrganizeError::InvalidFolder(file.to_path_buf()))?;
        let target = destination_for(dest_root, &local_time(time), name);
        self.transfer(file, &target)
    }

    /// Copy or move `src` to `dest`, creating missing folders.
    ///
    /// An existing byte-identical file at `dest` makes this a no-op; a
    /// different one makes the incoming file take a numbered name.
    ///
    /// # Errors
    ///
    /// `Comparison` if the existing file cannot be compared, `Io` if the
    /// transfer fails.
    pub fn transfer(&self, src: &Path, dest: &Path) -> Result<TransferOutcome, OrganizeError> {
        let mut dest = dest.to_path_buf();

        match dest.parent() {
            Some(parent) if !parent.exists() => {
                log::info!("Creating folder {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| OrganizeError::io(parent, e))?;
            }
            _ if dest.exists() => {
                if are_byte_identical(src, &dest)? {
                    log::info!("Skipping duplicate file '{}'", dest.display());
                    return Ok(TransferOutcome::Skipped(dest));
                }
                dest = unique_name(&dest);
                log::debug!("Name taken, using {}", dest.display());
            }
            _ => {}
        }

        match self.mode {
            TransferMode::Copy => {
                log::info!("Copying {} to {}", src.display(), dest.display());
                copy_preserving_mtime(src, &dest)?;
            }
            TransferMode::Move => {
                log::info!("Moving {} to {}", src.display(), dest.display());
                move_file(src, &dest)?;
            }
        }

        Ok(TransferOutcome::Transferred(dest))
    }
}

/// Check both folders and return their canonical forms.
fn validate_folders(source: &Path, dest: &Path) -> Result<(PathBuf, PathBuf), OrganizeError> {
    let canonical = |path: &Path| {
        if !path.is_dir() {
            return Err(OrganizeError::InvalidFolder(path.to_path_buf()));
        }
        path.canonicalize().map_err(|e| OrganizeError::io(path, e))
    };

    let source = canonical(source)?;
    let dest = canonical(dest)?;
    if source == dest {
        return Err(OrganizeError::SameFolder(source));
    }
    Ok((source, dest))
}

fn copy_preserving_mtime(src: &Path, dest: &Path) -> Result<(), OrganizeError> {
    let metadata = fs::metadata(src).map_err(|e| OrganizeError::io(src, e))?;
    fs::copy(src, dest).map_err(|e| OrganizeError::io(dest, e))?;
    filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&metadata))
        .map_err(|e| OrganizeError::io(dest, e))
}

/// Rename, falling back to copy and remove across file systems.
fn move_file(src: &Path, dest: &Path) -> Result<(), OrganizeError> {
    if fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    copy_preserving_mtime(src, dest)?;
    fs::remove_file(src).map_err(|e| OrganizeError::io(src, e))
}
