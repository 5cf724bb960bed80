use super::*;

#[test]
fn from_io_maps_well_known_kinds() {
    let path = Path::new("/ws/a.txt");

    let err = EngineError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
    assert!(matches!(err, EngineError::NotFound(ref p) if p == path));

    let err = EngineError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);

    let err = EngineError::from_io(path, io::Error::from(io::ErrorKind::AlreadyExists));
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
}

#[test]
fn from_io_keeps_unknown_failures_with_source() {
    let err = EngineError::from_io("/ws/x", io::Error::new(io::ErrorKind::Other, "disk on fire"));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("/ws/x"));
    assert!(err.to_string().contains("disk on fire"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn display_names_the_offending_path() {
    let err = EngineError::NotFound(PathBuf::from("/ws/missing"));
    assert_eq!(err.to_string(), "Not found: /ws/missing");

    let err = EngineError::UnreadableFile {
        path: PathBuf::from("/ws/blob.bin"),
        reason: "invalid UTF-8 at byte 0".to_string(),
    };
    assert!(err.to_string().contains("/ws/blob.bin"));
    assert!(err.to_string().contains("invalid UTF-8"));

    assert_eq!(EngineError::MissingName.to_string(), "Missing name");
    assert_eq!(EngineError::Cancelled.to_string(), "Cancelled");
}

#[test]
fn validation_errors_are_classified() {
    assert!(EngineError::MissingName.is_validation());
    assert!(EngineError::InvalidName("a/b".into()).is_validation());
    assert!(EngineError::InvalidParent(PathBuf::from("/f")).is_validation());
    assert!(EngineError::CyclicDestination(PathBuf::from("/d")).is_validation());
    assert!(EngineError::OutsideWorkspace(PathBuf::from("/etc")).is_validation());

    assert!(!EngineError::NotFound(PathBuf::from("/x")).is_validation());
    assert!(!EngineError::Cancelled.is_validation());
}
