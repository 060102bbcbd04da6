//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileRecord`]s for duplicate detection.
//!
//! # Features
//!
//! - Children sorted by file name, so the same tree always yields the same order
//! - Only regular files are reported, decided from `symlink_metadata`
//! - Explicit [`WalkErrorPolicy`] for unreadable directories
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use distinctpics::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default());
//! let outcome = walker.collect().unwrap();
//! println!("Found {} files", outcome.records.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileRecord, ScanError, WalkErrorPolicy, WalkerConfig};
use crate::progress::ProgressCallback;

/// Result of a completed walk.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Regular files in traversal order
    pub records: Vec<FileRecord>,
    /// Paths skipped under [`WalkErrorPolicy::Skip`]
    pub skipped: Vec<ScanError>,
}

/// Directory walker for file discovery.
pub struct Walker {
    /// Absolute root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The root is canonicalized so that `..` and symlinked components are
    /// resolved. A root that does not exist is only made absolute and is
    /// reported by [`Walker::check_root`].
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let root = std::fs::canonicalize(path)
            .or_else(|_| std::path::absolute(path))
            .unwrap_or_else(|_| path.to_path_buf());
        Self {
            root,
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops iteration
    /// as soon as possible.
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

    /// The absolute root this walker scans.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Verify that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// [`ScanError::NotFound`], [`ScanError::NotADirectory`], or
    /// [`ScanError::Access`] if the root cannot be inspected.
    pub fn check_root(&self) -> Result<(), ScanError> {
        match std::fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(self.root.clone()))
            }
            Err(e) => Err(ScanError::Access {
                path: self.root.clone(),
                source: e,
            }),
        }
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; [`Walker::collect`] applies the configured policy.
    /// The root itself is not validated here, see [`Walker::check_root`].
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(mut entry) => {
                    let path = entry.path();

                    // jwalk attaches a failed read_dir to the directory entry itself
                    if let Some(error) = entry.read_children_error.take() {
                        return Some(Err(self.handle_jwalk_error(path, error)));
                    }

                    if path == self.root || entry.file_type().is_dir() {
                        return None;
                    }

                    self.process_entry(path)
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            })
    }

    /// Walk the whole tree and apply the configured error policy.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] / [`ScanError::NotADirectory`] for a bad root
    /// - [`ScanError::Access`] for the first unreadable path under
    ///   [`WalkErrorPolicy::Abort`]
    /// - [`ScanError::Interrupted`] if the shutdown flag was raised
    pub fn collect(&self) -> Result<WalkOutcome, ScanError> {
        self.check_root()?;

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let outcome = self.apply_policy(self.walk())?;

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.is_shutdown_requested() {
            return Err(ScanError::Interrupted);
        }

        log::debug!(
            "Walk of {} complete: {} files, {} skipped",
            self.root.display(),
            outcome.records.len(),
            outcome.skipped.len()
        );

        Ok(outcome)
    }

    /// Sort walk results into records and skipped paths, or stop at the
    /// first error under [`WalkErrorPolicy::Abort`].
    fn apply_policy(
        &self,
        results: impl Iterator<Item = Result<FileRecord, ScanError>>,
    ) -> Result<WalkOutcome, ScanError> {
        let mut outcome = WalkOutcome::default();
        for result in results {
            match result {
                Ok(record) => {
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(
                            outcome.records.len() + 1,
                            record.path.to_string_lossy().as_ref(),
                        );
                    }
                    outcome.records.push(record);
                }
                Err(e) => match self.config.error_policy {
                    WalkErrorPolicy::Abort => {
                        log::error!("Aborting scan: {}", e);
                        return Err(e);
                    }
                    WalkErrorPolicy::Skip => {
                        log::warn!("Skipping unreadable path: {}", e);
                        outcome.skipped.push(e);
                    }
                },
            }
        }
        Ok(outcome)
    }

    /// Stat a non-directory entry and keep it only if it is a regular file.
    fn process_entry(&self, path: PathBuf) -> Option<Result<FileRecord, ScanError>> {
        // symlink_metadata so that links are classified, not followed
        let metadata = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(&path, e))),
        };

        if !metadata.file_type().is_file() {
            log::trace!("Skipping non-regular entry: {}", path.display());
            return None;
        }

        Some(Ok(FileRecord {
            path,
            size: metadata.len(),
        }))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        match error.kind() {
            std::io::ErrorKind::NotFound => {
                log::debug!("File vanished during scan: {}", path.display());
            }
            _ => log::warn!("I/O error for {}: {}", path.display(), error),
        }
        ScanError::Access {
            path: path.to_path_buf(),
            source: error,
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        let kind = error
            .io_error()
            .map_or(std::io::ErrorKind::Other, std::io::Error::kind);
        ScanError::Access {
            path,
            source: std::io::Error::new(kind, error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    /// Create a test directory with some files.
    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        let mut f = File::create(dir.path().join("file1.txt")).unwrap();
        writeln!(f, "Hello, world!").unwrap();

        let mut f = File::create(dir.path().join("file2.txt")).unwrap();
        writeln!(f, "Another file").unwrap();

        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        let mut f = File::create(subdir.join("nested.txt")).unwrap();
        writeln!(f, "Nested file content").unwrap();

        dir
    }

    #[test]
    fn test_walker_finds_files() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.size > 0);
            assert!(file.path.is_absolute());
            assert!(file.path.exists());
        }
    }

    #[test]
    fn test_walker_keeps_empty_files() {
        let dir = create_test_dir();
        File::create(dir.path().join("empty.txt")).unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 4);
        assert!(files.iter().any(|f| f.size == 0));
    }

    #[test]
    fn test_walker_includes_hidden_files() {
        let dir = create_test_dir();
        fs::write(dir.path().join(".hidden"), "Hidden content").unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert!(files
            .iter()
            .any(|f| f.path.file_name().unwrap() == ".hidden"));
    }

    #[test]
    fn test_walker_deterministic_order() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::default());

        let first: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        let second: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_walker_relative_root_becomes_absolute() {
        let walker = Walker::new(Path::new("."), WalkerConfig::default());
        assert!(walker.root().is_absolute());
    }

    #[test]
    fn test_walker_root_is_resolved() {
        let dir = create_test_dir();
        let dotted = dir.path().join("subdir").join("..");

        let walker = Walker::new(&dotted, WalkerConfig::default());
        assert_eq!(walker.root(), fs::canonicalize(dir.path()).unwrap());

        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
        assert!(files
            .iter()
            .all(|f| !f.path.components().any(|c| c == std::path::Component::ParentDir)));
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_symlinked_root_is_resolved() {
        let dir = create_test_dir();
        let link = dir.path().join("alias");
        std::os::unix::fs::symlink(dir.path().join("subdir"), &link).unwrap();

        let walker = Walker::new(&link, WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].path,
            fs::canonicalize(dir.path().join("subdir").join("nested.txt")).unwrap()
        );
    }

    fn access_error(path: &str) -> ScanError {
        ScanError::Access {
            path: PathBuf::from(path),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        }
    }

    fn mixed_results() -> Vec<Result<FileRecord, ScanError>> {
        vec![
            Ok(FileRecord::new("/t/a.txt", 4)),
            Err(access_error("/t/locked")),
            Ok(FileRecord::new("/t/b.txt", 4)),
        ]
    }

    #[test]
    fn test_abort_policy_stops_at_unreadable_directory() {
        let walker = Walker::new(Path::new("/t"), WalkerConfig::default());

        match walker.apply_policy(mixed_results().into_iter()) {
            Err(ScanError::Access { path, .. }) => assert_eq!(path, PathBuf::from("/t/locked")),
            other => panic!("Expected Access, got {:?}", other.map(|o| o.records)),
        }
    }

    #[test]
    fn test_skip_policy_records_unreadable_directory() {
        let walker = Walker::new(Path::new("/t"), WalkerConfig::skipping());

        let outcome = walker.apply_policy(mixed_results().into_iter()).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].path(), Some(Path::new("/t/locked")));
    }

    #[cfg(unix)]
    #[test]
    fn test_walker_skips_symlinks() {
        let dir = create_test_dir();
        std::os::unix::fs::symlink(dir.path().join("file1.txt"), dir.path().join("link.txt"))
            .unwrap();

        let walker = Walker::new(dir.path(), WalkerConfig::default());
        let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 3);
        assert!(!files
            .iter()
            .any(|f| f.path.file_name().unwrap() == "link.txt"));
    }

    #[test]
    fn test_collect_missing_root() {
        let dir = TempDir::new().unwrap();
        let walker = Walker::new(&dir.path().join("missing"), WalkerConfig::default());

        match walker.collect() {
            Err(ScanError::NotFound(_)) => {}
            other => panic!("Expected NotFound, got {:?}", other.map(|o| o.records)),
        }
    }

    #[test]
    fn test_collect_file_root() {
        let dir = create_test_dir();
        let walker = Walker::new(&dir.path().join("file1.txt"), WalkerConfig::default());

        assert!(matches!(
            walker.collect(),
            Err(ScanError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_collect_interrupted() {
        let dir = create_test_dir();
        let flag = Arc::new(AtomicBool::new(true));
        let walker =
            Walker::new(dir.path(), WalkerConfig::default()).with_shutdown_flag(flag.clone());

        assert!(matches!(walker.collect(), Err(ScanError::Interrupted)));
    }

    #[test]
    fn test_collect_returns_all_records() {
        let dir = create_test_dir();
        let walker = Walker::new(dir.path(), WalkerConfig::skipping());

        let outcome = walker.collect().unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert!(outcome.skipped.is_empty());
    }
}
