//! Destination paths for the photo sorter.

use std::ffi::OsStr;
use std::fmt::Display;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, TimeZone};

/// Timestamp used to file a photo: the earlier of its modification and
/// creation times.
///
/// Copying a file resets its creation time on most systems while the
/// modification time survives, so the minimum is the closest to when the
/// picture was taken. Platforms without a creation time use mtime alone.
#[must_use]
pub fn file_time(metadata: &Metadata) -> Option<SystemTime> {
    match (metadata.modified().ok(), metadata.created().ok()) {
        (Some(modified), Some(created)) => Some(modified.min(created)),
        (modified, created) => modified.or(created),
    }
}

/// Convert a file time to local time.
#[must_use]
pub fn local_time(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}

/// Month folder name, e.g. `3 - Mar`.
#[must_use]
pub fn month_folder<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{} - {}", time.month(), time.format("%b"))
}

/// Where a file lands under `dest_root`: `<dest>/<YYYY>/<M> - <Mon>/<name>`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use distinctpics::organize::destination_for;
/// use std::ffi::OsStr;
/// use std::path::Path;
///
/// let time = Utc.with_ymd_and_hms(2019, 3, 14, 12, 0, 0).unwrap();
/// let dest = destination_for(Path::new("/pics"), &time, OsStr::new("a.jpg"));
/// assert_eq!(dest, Path::new("/pics/2019/3 - Mar/a.jpg"));
/// ```
#[must_use]
pub fn destination_for<Tz>(dest_root: &Path, time: &DateTime<Tz>, file_name: &OsStr) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dest_root
        .join(time.year().to_string())
        .join(month_folder(time))
        .join(file_name)
}

/// First free variant of `path`: `stem (1).ext`, `stem (2).ext`, and so on.
///
/// Returns `path` unchanged if nothing exists there yet.
#[must_use]
pub fn unique_name(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    (1u64..)
        .map(|n| {
            let name = match &extension {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            parent.join(name)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
