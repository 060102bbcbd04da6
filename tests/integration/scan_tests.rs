use distinctpics::duplicates::{
    cluster_paths, find_duplicate_clusters, group_by_size, group_by_size_with, DuplicateFinder,
    FinderConfig,
};
use distinctpics::scanner::{ScanError, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn names(clusters: &[Vec<PathBuf>]) -> Vec<Vec<String>> {
    clusters
        .iter()
        .map(|c| {
            c.iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        })
        .collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (clusters, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(clusters.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_clusters, 0);
}

#[test]
fn test_two_clusters_and_a_unique_file_of_same_size() {
    // a, c, d share content X; b, f share Y; e is Z. All are 8 bytes.
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"XXXXXXXX");
    write(dir.path(), "b", b"YYYYYYYY");
    write(dir.path(), "c", b"XXXXXXXX");
    write(dir.path(), "d", b"XXXXXXXX");
    write(dir.path(), "e", b"ZZZZZZZZ");
    write(dir.path(), "f", b"YYYYYYYY");

    let clusters = find_duplicate_clusters(dir.path()).unwrap();

    assert_eq!(
        names(&cluster_paths(&clusters)),
        vec![vec!["a", "c", "d"], vec!["b", "f"]]
    );
}

#[test]
fn test_different_sizes_never_cluster() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.bin", b"1");
    write(dir.path(), "two.bin", b"22");
    write(dir.path(), "three.bin", b"333");

    let (clusters, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(clusters.is_empty());
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.comparisons, 0);
}

#[test]
fn test_group_by_size_covers_every_file() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.jpg", b"1234");
    write(dir.path(), "sub/b.jpg", b"abcd");
    write(dir.path(), "sub/deeper/c.jpg", b"12345");

    let groups = group_by_size(dir.path()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[&4].len(), 2);
    assert_eq!(groups[&5].len(), 1);
    assert!(groups
        .values()
        .flatten()
        .all(|f| f.path.is_absolute()));
}

#[test]
fn test_zero_byte_files_form_a_cluster() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");
    write(dir.path(), "full", b"data");

    let clusters = find_duplicate_clusters(dir.path()).unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].size, 0);
    assert_eq!(names(&cluster_paths(&clusters)), vec![vec!["empty1", "empty2"]]);
}

#[test]
fn test_single_file_tree() {
    let dir = tempdir().unwrap();
    write(dir.path(), "only.jpg", b"pixels");

    let (clusters, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(clusters.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"nested duplicate");
    write(dir.path(), "x/y/z/bottom.txt", b"nested duplicate");

    let clusters = find_duplicate_clusters(dir.path()).unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 2);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        let content = format!("content-{}", i % 4);
        write(dir.path(), &format!("dir{}/file{i}.dat", i % 3), content.as_bytes());
    }

    let first = find_duplicate_clusters(dir.path()).unwrap();
    let second = find_duplicate_clusters(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert_eq!(first.iter().map(|c| c.len()).sum::<usize>(), 20);
}

#[test]
fn test_thread_count_does_not_change_result() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        let content = vec![(i % 5) as u8; 100 + (i % 3)];
        write(dir.path(), &format!("f{i:02}"), &content);
    }

    let single = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let many = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(single, many);
}

#[test]
fn test_clusters_are_disjoint_and_sorted() {
    let dir = tempdir().unwrap();
    write(dir.path(), "b1", b"bb");
    write(dir.path(), "b2", b"bb");
    write(dir.path(), "a1", b"aa");
    write(dir.path(), "a2", b"aa");
    write(dir.path(), "long1", b"longer content");
    write(dir.path(), "long2", b"longer content");

    let clusters = find_duplicate_clusters(dir.path()).unwrap();
    let all: Vec<_> = clusters.iter().flat_map(|c| c.paths()).collect();
    let mut unique = all.clone();
    unique.sort();
    unique.dedup();

    assert_eq!(all.len(), unique.len());
    assert_eq!(
        names(&cluster_paths(&clusters)),
        vec![vec!["a1", "a2"], vec!["b1", "b2"], vec!["long1", "long2"]]
    );
}

#[test]
fn test_root_that_is_a_file() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "file.txt", b"x");

    let result = group_by_size_with(&file, &WalkerConfig::default());
    assert!(matches!(result, Err(ScanError::NotADirectory(_))));
}

#[cfg(unix)]
#[test]
#[ignore = "permission bits are not enforced for root; run with --ignored as a regular user"]
fn test_unreadable_directory_policy() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write(&locked, "hidden.txt", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        panic!("{} is still readable; run this test as a non-root user", locked.display());
    }

    let aborted = group_by_size(dir.path());
    let skipped = DuplicateFinder::new(
        FinderConfig::default().with_walker_config(WalkerConfig::skipping()),
    )
    .find_duplicates(dir.path());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(aborted, Err(ScanError::Access { .. })));
    let (clusters, summary) = skipped.unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 2);
    assert!(!summary.skipped_paths.is_empty());
    assert!(summary.has_errors());
}
