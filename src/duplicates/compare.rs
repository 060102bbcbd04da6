//! Full-content byte comparison of two files.
//!
//! This is the primitive the partitioner is built on, and the check the
//! photo sorter uses to decide whether an incoming file is already present
//! at its destination. There is no metadata shortcut: files with equal size
//! and equal timestamps are still compared byte for byte.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Read buffer size used for each side of a comparison.
pub const COMPARE_BUFFER_SIZE: usize = 64 * 1024;

/// A file could not be read while comparing two files.
///
/// Never means "equal" or "different"; the caller decides whether to skip
/// the unreadable file or abort.
#[derive(thiserror::Error, Debug)]
#[error(
    "Cannot compare {} with {}: failed to read {}: {source}",
    .left.display(),
    .right.display(),
    .unreadable.display()
)]
pub struct ComparisonError {
    /// First file of the pair
    pub left: PathBuf,
    /// Second file of the pair
    pub right: PathBuf,
    /// Which of the two could not be read
    pub unreadable: PathBuf,
    /// The underlying I/O error
    #[source]
    pub source: io::Error,
}

impl ComparisonError {
    fn new(left: &Path, right: &Path, unreadable: &Path, source: io::Error) -> Self {
        Self {
            left: left.to_path_buf(),
            right: right.to_path_buf(),
            unreadable: unreadable.to_path_buf(),
            source,
        }
    }

    /// Both paths of the pair that was being compared.
    #[must_use]
    pub fn paths(&self) -> (&Path, &Path) {
        (&self.left, &self.right)
    }
}

/// Compare two files by full content.
///
/// Files of different length are reported as different without reading
/// their contents. Two empty files are byte-identical.
///
/// # Errors
///
/// Returns [`ComparisonError`] naming both paths if either file cannot be
/// opened, inspected, or read.
///
/// # Example
///
/// ```no_run
/// use distinctpics::duplicates::are_byte_identical;
/// use std::path::Path;
///
/// if are_byte_identical(Path::new("a.jpg"), Path::new("b.jpg")).unwrap() {
///     println!("duplicates");
/// }
/// ```
pub fn are_byte_identical(left: &Path, right: &Path) -> Result<bool, ComparisonError> {
    let open = |path: &Path| -> Result<(File, u64), ComparisonError> {
        let file = File::open(path).map_err(|e| ComparisonError::new(left, right, path, e))?;
        let len = file
            .metadata()
            .map_err(|e| ComparisonError::new(left, right, path, e))?
            .len();
        Ok((file, len))
    };

    let (left_file, left_len) = open(left)?;
    let (right_file, right_len) = open(right)?;

    if left_len != right_len {
        log::trace!(
            "Length mismatch ({} vs {}): {} / {}",
            left_len,
            right_len,
            left.display(),
            right.display()
        );
        return Ok(false);
    }

    let (mut left_reader, mut right_reader) = (left_file, right_file);
    let mut left_buf = vec![0u8; COMPARE_BUFFER_SIZE];
    let mut right_buf = vec![0u8; COMPARE_BUFFER_SIZE];

    loop {
        let left_read = fill(&mut left_reader, &mut left_buf)
            .map_err(|e| ComparisonError::new(left, right, left, e))?;
        let right_read = fill(&mut right_reader, &mut right_buf)
            .map_err(|e| ComparisonError::new(left, right, right, e))?;

        if left_read != right_read || left_buf[..left_read] != right_buf[..right_read] {
            return Ok(false);
        }
        if left_read == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
