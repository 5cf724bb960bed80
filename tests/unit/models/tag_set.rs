use super::*;

#[test]
fn tag_is_idempotent() {
    let mut tags = TagSet::new();
    tags.tag("/ws/a.txt");
    tags.tag("/ws/a.txt");
    assert_eq!(tags.len(), 1);
    assert!(tags.is_tagged(Path::new("/ws/a.txt")));
}

#[test]
fn untag_missing_path_is_noop() {
    let mut tags = TagSet::new();
    tags.tag("/ws/a.txt");
    tags.untag(Path::new("/ws/b.txt"));
    assert_eq!(tags.len(), 1);
}

#[test]
fn toggle_flips_and_reports_new_state() {
    let mut tags = TagSet::new();
    assert!(tags.toggle("/ws/a"));
    assert!(tags.is_tagged(Path::new("/ws/a")));
    assert!(!tags.toggle("/ws/a"));
    assert!(tags.is_empty());
}

#[test]
fn tagged_is_sorted() {
    let mut tags = TagSet::new();
    tags.tag("/ws/c");
    tags.tag("/ws/a");
    tags.tag("/ws/b/x");
    assert_eq!(
        tags.tagged(),
        vec![
            PathBuf::from("/ws/a"),
            PathBuf::from("/ws/b/x"),
            PathBuf::from("/ws/c")
        ]
    );
}

#[test]
fn forget_subtree_drops_descendants_only() {
    let mut tags = TagSet::new();
    tags.tag("/ws/dir");
    tags.tag("/ws/dir/inner.txt");
    tags.tag("/ws/dir2/file.txt");
    tags.tag("/ws/other.txt");

    assert_eq!(tags.forget_subtree(Path::new("/ws/dir")), 2);
    // 按路径组件匹配，dir2 不受影响
    assert!(tags.is_tagged(Path::new("/ws/dir2/file.txt")));
    assert!(tags.is_tagged(Path::new("/ws/other.txt")));
    assert_eq!(tags.len(), 2);
}

#[test]
fn untag_all_clears() {
    let mut tags = TagSet::new();
    tags.tag("/ws/a");
    tags.tag("/ws/b");
    tags.untag_all();
    assert!(tags.is_empty());
    assert!(tags.tagged().is_empty());
}
