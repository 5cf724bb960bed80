use super::*;
use crate::kernel::services::adapters::LocalFileProvider;
use std::fs;
use tempfile::{tempdir, TempDir};

fn model() -> (TempDir, FileTreeModel) {
    let dir = tempdir().unwrap();
    let resolver = PathResolver::new(dir.path());
    let tree = FileTreeModel::new(Arc::new(LocalFileProvider::new()), resolver);
    (dir, tree)
}

fn names(entries: &[FileSystemEntry]) -> Vec<String> {
    entries.iter().map(|e| e.name.clone()).collect()
}

#[test]
fn list_reads_disk_and_reports_tags() {
    let (dir, tree) = model();
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();

    let mut tags = TagSet::new();
    tags.tag(tree.root().join("a.txt"));

    let entries = tree.list(Path::new(""), &tags).unwrap();
    assert_eq!(names(&entries), vec!["a.txt", "docs"]);
    assert!(entries[0].tagged);
    assert_eq!(entries[0].size, 5);
    assert_eq!(entries[1].kind, EntryKind::Directory);
    assert!(!entries[1].tagged);
}

#[test]
fn list_missing_and_file_targets_fail() {
    let (dir, tree) = model();
    fs::write(dir.path().join("a.txt"), "").unwrap();
    let tags = TagSet::new();

    assert!(matches!(
        tree.list(Path::new("nope"), &tags),
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        tree.list(Path::new("a.txt"), &tags),
        Err(EngineError::NotADirectory(_))
    ));
}

#[test]
fn snapshot_is_invalidated_by_mutations() {
    let (_dir, mut tree) = model();
    let tags = TagSet::new();
    assert!(tree.entries(&tags).unwrap().is_empty());

    tree.create_file(Path::new(""), "new.md").unwrap();
    assert_eq!(names(tree.entries(&tags).unwrap()), vec!["new.md"]);
}

#[test]
fn entries_follow_tag_changes_without_rereading() {
    let (dir, mut tree) = model();
    fs::write(dir.path().join("a.txt"), "").unwrap();
    let mut tags = TagSet::new();
    assert!(!tree.entries(&tags).unwrap()[0].tagged);

    tags.tag(tree.root().join("a.txt"));
    assert!(tree.entries(&tags).unwrap()[0].tagged);
}

#[test]
fn refresh_picks_up_external_changes() {
    let (dir, mut tree) = model();
    let tags = TagSet::new();
    assert!(tree.entries(&tags).unwrap().is_empty());

    fs::write(dir.path().join("outside.txt"), "").unwrap();
    assert_eq!(names(tree.refresh(&tags).unwrap()), vec!["outside.txt"]);
}

#[test]
fn navigate_up_stops_at_root() {
    let (dir, tree) = model();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    let root = tree.root().to_path_buf();

    assert_eq!(tree.navigate_up(&root.join("a/b")), root.join("a"));
    assert_eq!(tree.navigate_up(&root.join("a")), root);
    assert_eq!(tree.navigate_up(&root), root);
    assert_eq!(tree.navigate_up(Path::new("/definitely/outside")), root);
}

#[test]
fn navigate_and_go_up_move_the_view() {
    let (dir, mut tree) = model();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    fs::write(dir.path().join("file.txt"), "").unwrap();

    let b = tree.navigate(Path::new("a/b")).unwrap();
    assert_eq!(tree.current(), b.as_path());
    assert_eq!(tree.go_up(), tree.root().join("a"));

    assert!(matches!(
        tree.navigate(Path::new("file.txt")),
        Err(EngineError::NotADirectory(_))
    ));
    assert!(matches!(
        tree.navigate(Path::new("ghost")),
        Err(EngineError::NotFound(_))
    ));
    assert_eq!(tree.current(), tree.root().join("a").as_path());
}

#[test]
fn create_folder_validates_before_touching_disk() {
    let (dir, mut tree) = model();
    fs::write(dir.path().join("plain.txt"), "").unwrap();

    let created = tree.create_folder(Path::new(""), "reports").unwrap();
    assert!(created.is_dir());

    assert!(matches!(
        tree.create_folder(Path::new(""), "reports"),
        Err(EngineError::AlreadyExists(_))
    ));
    assert!(matches!(
        tree.create_folder(Path::new("plain.txt"), "x"),
        Err(EngineError::InvalidParent(_))
    ));
    assert!(matches!(
        tree.create_folder(Path::new(""), ""),
        Err(EngineError::MissingName)
    ));
    assert!(matches!(
        tree.create_folder(Path::new("../.."), "evil"),
        Err(EngineError::OutsideWorkspace(_))
    ));
}

#[test]
fn delete_directory_forgets_tags_and_leaves_view() {
    let (dir, mut tree) = model();
    fs::create_dir_all(dir.path().join("proj/sub")).unwrap();
    fs::write(dir.path().join("proj/sub/x.txt"), "").unwrap();

    let mut tags = TagSet::new();
    tags.tag(tree.root().join("proj/sub/x.txt"));
    tags.tag(tree.root().join("keep"));
    tree.navigate(Path::new("proj/sub")).unwrap();

    tree.delete(Path::new("proj"), &mut tags).unwrap();
    assert!(!dir.path().join("proj").exists());
    assert_eq!(tags.len(), 1);
    assert_eq!(tree.current(), tree.root());
}

#[test]
fn delete_rejects_root_and_missing() {
    let (_dir, mut tree) = model();
    let mut tags = TagSet::new();
    assert!(matches!(
        tree.delete(Path::new(""), &mut tags),
        Err(EngineError::OutsideWorkspace(_))
    ));
    assert!(matches!(
        tree.delete(Path::new("ghost"), &mut tags),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn delete_of_missing_path_forgets_its_tags() {
    let (_dir, mut tree) = model();
    let mut tags = TagSet::new();
    let ghost = tree.root().join("ghost");
    tags.tag(ghost.clone());
    tags.tag(ghost.join("inner.txt"));

    assert!(matches!(
        tree.delete(&ghost, &mut tags),
        Err(EngineError::NotFound(_))
    ));
    assert!(tags.is_empty());
}

#[test]
fn rebase_follows_moved_directory() {
    let (dir, mut tree) = model();
    fs::create_dir_all(dir.path().join("a/sub")).unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    tree.navigate(Path::new("a/sub")).unwrap();

    tree.rebase(&dir.path().join("other"), &dir.path().join("b/other"));
    assert_eq!(tree.current(), dir.path().join("a/sub").as_path());

    fs::rename(dir.path().join("a"), dir.path().join("b/a")).unwrap();
    tree.rebase(&dir.path().join("a"), &dir.path().join("b/a"));
    assert_eq!(tree.current(), dir.path().join("b/a/sub").as_path());
}

#[test]
fn rename_in_place() {
    let (dir, mut tree) = model();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    fs::write(dir.path().join("b.txt"), "y").unwrap();
    let mut tags = TagSet::new();
    tags.tag(tree.root().join("a.txt"));

    let renamed = tree.rename(Path::new("a.txt"), "c.txt", &mut tags).unwrap();
    assert_eq!(renamed, tree.root().join("c.txt"));
    assert_eq!(fs::read_to_string(&renamed).unwrap(), "x");
    assert!(tags.is_empty());

    assert!(matches!(
        tree.rename(Path::new("c.txt"), "b.txt", &mut tags),
        Err(EngineError::AlreadyExists(_))
    ));
    assert!(matches!(
        tree.rename(Path::new("c.txt"), "sub/d.txt", &mut tags),
        Err(EngineError::InvalidName(_))
    ));
    // 同名是空操作
    assert_eq!(
        tree.rename(Path::new("c.txt"), "c.txt", &mut tags).unwrap(),
        renamed
    );
}

#[test]
fn rename_rebases_current_view() {
    let (dir, mut tree) = model();
    fs::create_dir_all(dir.path().join("old/inner")).unwrap();
    let mut tags = TagSet::new();
    tree.navigate(Path::new("old/inner")).unwrap();

    tree.rename(Path::new("old"), "new", &mut tags).unwrap();
    assert_eq!(tree.current(), tree.root().join("new/inner").as_path());
}

#[test]
fn properties_and_preview() {
    let (dir, tree) = model();
    fs::write(dir.path().join("notes.md"), "# Title\nbody").unwrap();
    fs::create_dir(dir.path().join("folder")).unwrap();

    let props = tree.properties(Path::new("notes.md")).unwrap();
    assert_eq!(props.name, "notes.md");
    assert_eq!(props.size, 12);
    assert_eq!(props.kind, EntryKind::File);

    let preview = tree.preview(Path::new("notes.md"), 7).unwrap();
    assert_eq!(preview.text, "# Title");
    assert!(preview.truncated);

    assert!(matches!(
        tree.preview(Path::new("folder"), 16),
        Err(EngineError::UnreadableFile { .. })
    ));
}

#[test]
fn preview_drops_split_utf8_tail() {
    let (dir, tree) = model();
    fs::write(dir.path().join("u.txt"), "aé").unwrap();

    // "é" 占两个字节，只读到第一个
    let preview = tree.preview(Path::new("u.txt"), 2).unwrap();
    assert_eq!(preview.text, "a");
    assert!(preview.truncated);
}

#[test]
fn walk_lists_subtree_with_tags() {
    let (dir, tree) = model();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a/x.txt"), "").unwrap();
    let mut tags = TagSet::new();
    tags.tag(tree.root().join("a/x.txt"));

    let entries = tree.walk(Path::new(""), &tags).unwrap();
    assert_eq!(names(&entries), vec!["a", "x.txt"]);
    assert!(entries[1].tagged);
}
