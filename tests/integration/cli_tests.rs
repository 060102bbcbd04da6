use clap::Parser;
use distinctpics::cli::Cli;
use distinctpics::error::ExitCode;
use distinctpics::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["distinctpics", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_scan_exit_codes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"one").unwrap();
    fs::write(dir.path().join("b.txt"), b"two").unwrap();

    let code = run(&["scan", path_arg(dir.path())]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    fs::write(dir.path().join("c.txt"), b"one").unwrap();
    let code = run(&["scan", path_arg(dir.path()), "--output", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_missing_path_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = run(&["scan", path_arg(&missing)]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_scan_delete_permanent() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();

    let code = run(&["scan", path_arg(dir.path()), "--delete", "--permanent"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
}

#[test]
fn test_sort_command() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::write(src.path().join("a.jpg"), b"pixels").unwrap();

    let code = run(&["sort", path_arg(src.path()), path_arg(dest.path()), "--copy"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(src.path().join("a.jpg").exists());
}
