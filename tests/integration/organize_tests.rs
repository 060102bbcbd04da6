use distinctpics::organize::{Organizer, OrganizeError, TransferMode};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// Mid-month at noon UTC so the local date is the same in every time zone.
const MARCH_2019: i64 = 1_552_651_200;
const NOVEMBER_2021: i64 = 1_636_977_600;

fn photo(dir: &Path, name: &str, content: &[u8], unix_time: i64) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    filetime::set_file_mtime(&path, FileTime::from_unix_time(unix_time, 0)).unwrap();
    path
}

#[test]
fn test_copy_into_year_month_folders() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    photo(src.path(), "a.jpg", b"march picture", MARCH_2019);
    photo(src.path(), "trip/b.jpg", b"november picture", NOVEMBER_2021);

    let summary = Organizer::new(TransferMode::Copy)
        .run(src.path(), dest.path())
        .unwrap();

    assert_eq!(summary.copied, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.failed.is_empty());
    assert_eq!(
        fs::read(dest.path().join("2019").join("3 - Mar").join("a.jpg")).unwrap(),
        b"march picture"
    );
    assert!(dest
        .path()
        .join("2021")
        .join("11 - Nov")
        .join("b.jpg")
        .exists());
    assert!(src.path().join("a.jpg").exists());
}

#[test]
fn test_move_empties_source() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let a = photo(src.path(), "a.jpg", b"march picture", MARCH_2019);

    let summary = Organizer::new(TransferMode::Move)
        .run(src.path(), dest.path())
        .unwrap();

    assert_eq!(summary.copied, 1);
    assert!(!a.exists());
    assert!(dest.path().join("2019/3 - Mar/a.jpg").exists());
}

#[test]
fn test_second_run_skips_identical_files() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    photo(src.path(), "a.jpg", b"march picture", MARCH_2019);
    photo(src.path(), "b.jpg", b"another march picture", MARCH_2019);

    let organizer = Organizer::new(TransferMode::Copy);
    let first = organizer.run(src.path(), dest.path()).unwrap();
    let second = organizer.run(src.path(), dest.path()).unwrap();

    assert_eq!(first.copied, 2);
    assert_eq!(second.copied, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.to_string(), "2 file(s) total; 0 copied; 2 skipped");
}

#[test]
fn test_name_clash_with_different_content_renames() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    photo(src.path(), "one/IMG.jpg", b"first camera", MARCH_2019);
    photo(src.path(), "two/IMG.jpg", b"second camera", MARCH_2019);

    let summary = Organizer::new(TransferMode::Copy)
        .run(src.path(), dest.path())
        .unwrap();

    let month = dest.path().join("2019").join("3 - Mar");
    assert_eq!(summary.copied, 2);
    assert_eq!(fs::read(month.join("IMG.jpg")).unwrap(), b"first camera");
    assert_eq!(fs::read(month.join("IMG (1).jpg")).unwrap(), b"second camera");
}

#[test]
fn test_same_source_and_destination_rejected() {
    let dir = tempdir().unwrap();
    let result = Organizer::new(TransferMode::Copy).run(dir.path(), dir.path());
    assert!(matches!(result, Err(OrganizeError::SameFolder(_))));
}

#[test]
fn test_missing_destination_rejected() {
    let src = tempdir().unwrap();
    let result =
        Organizer::new(TransferMode::Copy).run(src.path(), &src.path().join("does-not-exist"));
    assert!(matches!(result, Err(OrganizeError::InvalidFolder(_))));
}

#[test]
fn test_destination_inside_source_is_not_resorted() {
    let src = tempdir().unwrap();
    let dest = src.path().join("sorted");
    fs::create_dir(&dest).unwrap();
    photo(src.path(), "a.jpg", b"march picture", MARCH_2019);
    photo(&dest, "2021/11 - Nov/old.jpg", b"already sorted", NOVEMBER_2021);

    let summary = Organizer::new(TransferMode::Move)
        .run(src.path(), &dest)
        .unwrap();

    assert_eq!(summary.total(), 1);
    assert!(dest.join("2021/11 - Nov/old.jpg").exists());
    assert!(dest.join("2019/3 - Mar/a.jpg").exists());
}
