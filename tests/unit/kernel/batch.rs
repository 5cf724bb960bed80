use super::*;
use std::path::PathBuf;

#[test]
fn cancel_flag_is_shared_between_clones() {
    let flag = CancelFlag::new();
    let handle = flag.clone();
    assert!(!cancelled(Some(&flag)));

    handle.cancel();
    assert!(flag.is_cancelled());
    assert!(cancelled(Some(&flag)));

    assert!(!cancelled(None));
}

#[test]
fn summarize_counts_successes_and_failures() {
    let items: Vec<DeleteItem> = vec![
        BatchItem::new(PathBuf::from("/ws/a"), Ok(())),
        BatchItem::new(
            PathBuf::from("/ws/b"),
            Err(EngineError::NotFound(PathBuf::from("/ws/b"))),
        ),
        BatchItem::cancelled(PathBuf::from("/ws/c")),
    ];
    assert_eq!(summarize(&items), (1, 2));
    assert!(matches!(items[2].error(), Some(EngineError::Cancelled)));
    assert!(items[0].error().is_none());
}
