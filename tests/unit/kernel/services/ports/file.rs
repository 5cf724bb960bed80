use super::*;

#[test]
fn test_dir_entry_new() {
    let entry = DirEntry::new(PathBuf::from("/ws/notes.md"), false);
    assert_eq!(entry.name, "notes.md");
    assert!(!entry.is_dir);
    assert!(entry.is_file);
    assert!(!entry.is_symlink);
    assert_eq!(entry.size, 0);
}

#[test]
fn test_dir_entry_new_directory() {
    let entry = DirEntry::new(PathBuf::from("/ws/drafts"), true);
    assert_eq!(entry.name, "drafts");
    assert!(entry.is_dir);
    assert!(!entry.is_file);
}

#[test]
fn test_file_metadata_from_std() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "12345").unwrap();

    let meta = FileMetadata::from_std(fs::metadata(&path).unwrap());
    assert_eq!(meta.size, 5);
    assert!(meta.is_file);
    assert!(!meta.is_dir);
    assert!(meta.modified.is_some());
    assert!(!meta.readonly);
}
