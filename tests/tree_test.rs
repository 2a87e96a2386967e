use extsmith::error::Error;
use extsmith::tree::{DirectoryOutcome, FileOutcome, TreeBuilder};
use std::fs;
use tempfile::TempDir;

#[cfg(unix)]
fn mode_of(path: &std::path::Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[test]
fn test_ensure_directory_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a/b/c");
    let tree = TreeBuilder::new();

    assert_eq!(tree.ensure_directory(&path).unwrap(), DirectoryOutcome::Created);
    #[cfg(unix)]
    let first = mode_of(&path);
    assert_eq!(tree.ensure_directory(&path).unwrap(), DirectoryOutcome::Existing);
    assert!(path.is_dir());

    #[cfg(unix)]
    {
        assert_eq!(first, 0o755);
        assert_eq!(mode_of(&path), first);
    }
}

#[test]
fn test_ensure_directory_over_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("taken");
    fs::write(&path, "x").unwrap();

    let result = TreeBuilder::new().ensure_directory(&path);
    assert!(matches!(result, Err(Error::IoError { .. })));
}

#[test]
fn test_ensure_file_writes_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/dir/file.php");

    let outcome = TreeBuilder::new().ensure_file(&path, "<?php\n").unwrap();
    assert_eq!(outcome, FileOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\n");
    #[cfg(unix)]
    assert_eq!(mode_of(&path), 0o644);
}

#[test]
fn test_ensure_file_empty_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("index.html");
    let tree = TreeBuilder::new();

    assert_eq!(tree.ensure_file(&path, "").unwrap(), FileOutcome::Empty);
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);

    // A zero length file is not a conflict.
    assert_eq!(tree.ensure_file(&path, "").unwrap(), FileOutcome::Empty);
    assert_eq!(tree.ensure_file(&path, "filled").unwrap(), FileOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "filled");
}

#[test]
fn test_conflict_leaves_content_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("manifest.xml");
    fs::write(&path, "original").unwrap();

    match TreeBuilder::new().ensure_file(&path, "replacement") {
        Err(Error::ConflictError { path: conflict }) => assert_eq!(conflict, path),
        other => panic!("Expected ConflictError, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(&path).unwrap(), "original");
}

#[test]
fn test_ensure_file_over_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("src");
    fs::create_dir(&path).unwrap();

    let result = TreeBuilder::new().ensure_file(&path, "content");
    assert!(matches!(result, Err(Error::IoError { .. })));
}

#[cfg(unix)]
#[test]
fn test_custom_modes() {
    let temp_dir = TempDir::new().unwrap();
    let tree = TreeBuilder::with_modes(0o700, 0o600);
    let dir = temp_dir.path().join("private");
    let file = dir.join("secret.ini");

    tree.ensure_directory(&dir).unwrap();
    tree.ensure_file(&file, "KEY=\"value\"\n").unwrap();
    assert_eq!(mode_of(&dir), 0o700);
    assert_eq!(mode_of(&file), 0o600);
}
