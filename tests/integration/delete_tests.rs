use distinctpics::actions::{delete_duplicates, DeleteConfig};
use distinctpics::duplicates::find_duplicate_clusters;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_scan_then_delete_keeps_one_copy_per_cluster() {
    let dir = tempdir().unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        fs::write(dir.path().join(name), b"same picture").unwrap();
    }
    fs::write(dir.path().join("x.png"), b"other").unwrap();
    fs::write(dir.path().join("y.png"), b"other").unwrap();
    fs::write(dir.path().join("unique.gif"), b"only one of these").unwrap();

    let clusters = find_duplicate_clusters(dir.path()).unwrap();
    let result = delete_duplicates(&clusters, &DeleteConfig::permanent());

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.bytes_freed, 12 * 2 + 5);

    let mut left: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left, vec!["a.jpg", "unique.gif", "x.png"]);

    // A second scan finds nothing left to remove.
    assert!(find_duplicate_clusters(dir.path()).unwrap().is_empty());
}

#[test]
fn test_dry_run_touches_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();

    let clusters = find_duplicate_clusters(dir.path()).unwrap();
    let result = delete_duplicates(&clusters, &DeleteConfig::permanent().with_dry_run(true));

    assert_eq!(result.success_count(), 1);
    assert!(result.dry_run);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_file_changed_after_scan_is_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();

    let clusters = find_duplicate_clusters(dir.path()).unwrap();
    fs::write(dir.path().join("b.txt"), b"edited since").unwrap();

    let result = delete_duplicates(&clusters, &DeleteConfig::permanent());

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failure_count(), 1);
    assert!(dir.path().join("b.txt").exists());
}
