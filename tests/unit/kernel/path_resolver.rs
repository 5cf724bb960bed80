use super::*;
use crate::kernel::services::adapters::LocalFileProvider;
use tempfile::tempdir;

fn resolver() -> PathResolver {
    PathResolver::new("/ws")
}

#[test]
fn relative_target_resolves_against_base() {
    let r = resolver();
    assert_eq!(
        r.resolve(Path::new("/ws/docs"), Path::new("a.txt")).unwrap(),
        PathBuf::from("/ws/docs/a.txt")
    );
    assert_eq!(
        r.resolve(Path::new("docs"), Path::new("a.txt")).unwrap(),
        PathBuf::from("/ws/docs/a.txt")
    );
}

#[test]
fn dot_segments_are_normalized() {
    let r = resolver();
    assert_eq!(
        r.resolve(Path::new("/ws/docs"), Path::new("./x/../b.md")).unwrap(),
        PathBuf::from("/ws/docs/b.md")
    );
    assert_eq!(
        r.resolve(Path::new("/ws/docs"), Path::new("..")).unwrap(),
        PathBuf::from("/ws")
    );
}

#[test]
fn escaping_the_root_is_rejected() {
    let r = resolver();
    let err = r.resolve(Path::new("/ws"), Path::new("../etc")).unwrap_err();
    assert!(matches!(err, EngineError::OutsideWorkspace(_)));

    let err = r.resolve_path(Path::new("/etc/passwd")).unwrap_err();
    assert!(matches!(err, EngineError::OutsideWorkspace(_)));

    // 前缀相同但不是子路径
    let err = r.resolve_path(Path::new("/ws2/a")).unwrap_err();
    assert!(matches!(err, EngineError::OutsideWorkspace(_)));
}

#[test]
fn empty_target_is_missing_name() {
    let r = resolver();
    assert!(matches!(
        r.resolve(Path::new("/ws"), Path::new("")),
        Err(EngineError::MissingName)
    ));
    assert!(matches!(
        r.resolve(Path::new("/ws"), Path::new("   ")),
        Err(EngineError::MissingName)
    ));
    assert_eq!(r.resolve_path(Path::new("")).unwrap(), PathBuf::from("/ws"));
}

#[test]
fn validate_name_rules() {
    assert_eq!(PathResolver::validate_name("notes.md").unwrap(), "notes.md");
    assert!(matches!(
        PathResolver::validate_name(""),
        Err(EngineError::MissingName)
    ));
    assert!(matches!(
        PathResolver::validate_name("  "),
        Err(EngineError::MissingName)
    ));
    for bad in [".", "..", "a/b", "a\\b"] {
        assert!(
            matches!(PathResolver::validate_name(bad), Err(EngineError::InvalidName(_))),
            "{bad:?} should be invalid"
        );
    }
}

#[test]
fn normalize_never_climbs_above_filesystem_root() {
    assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    assert_eq!(normalize(Path::new("../../b")), PathBuf::from("../../b"));
}

#[test]
fn relative_strips_root() {
    let r = resolver();
    assert_eq!(r.relative(Path::new("/ws/a/b.txt")), Path::new("a/b.txt"));
    assert_eq!(r.relative(Path::new("/other")), Path::new("/other"));
    assert!(r.is_root(Path::new("/ws")));
}

#[test]
fn new_child_checks_parent_and_siblings() {
    let dir = tempdir().unwrap();
    let r = PathResolver::new(dir.path());
    let provider = LocalFileProvider::new();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();

    let child = r.new_child(&provider, Path::new(""), "b.txt").unwrap();
    assert_eq!(child, r.root().join("b.txt"));

    let err = r.new_child(&provider, Path::new(""), "a.txt").unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists(_)));

    // 大小写不同的名称不算冲突
    assert!(r.new_child(&provider, Path::new(""), "A.TXT").is_ok());

    let err = r.new_child(&provider, Path::new("a.txt"), "x").unwrap_err();
    assert!(matches!(err, EngineError::InvalidParent(_)));

    let err = r.new_child(&provider, Path::new(""), "").unwrap_err();
    assert!(matches!(err, EngineError::MissingName));
}

#[test]
fn canonical_alias_of_root_is_accepted() {
    let dir = tempdir().unwrap();
    let r = PathResolver::new(dir.path());
    let canonical = std::fs::canonicalize(dir.path()).unwrap();
    let resolved = r.resolve_path(&canonical.join("x.txt")).unwrap();
    assert_eq!(resolved, r.root().join("x.txt"));
}
