use super::*;
use tempfile::tempdir;

#[test]
fn records_are_appended_in_order() {
    let mut log = AuditLog::in_memory();
    assert!(log.is_empty());
    log.info("Created folder docs");
    log.error("Delete ghost: Not found: /ws/ghost");

    assert_eq!(log.len(), 2);
    assert_eq!(log.records()[0].severity, Severity::Info);
    assert_eq!(log.records().last().unwrap().severity, Severity::Error);
    assert_eq!(log.errors().count(), 1);
    assert!(log.sink_path().is_none());
}

#[test]
fn line_format_is_timestamp_severity_message() {
    let mut log = AuditLog::in_memory();
    log.info("Saved #1 to a.txt");
    let line = log.records()[0].to_line();

    let parts: Vec<&str> = line.splitn(3, " - ").collect();
    assert_eq!(parts.len(), 3);
    assert!(DateTime::parse_from_rfc3339(parts[0]).is_ok());
    assert_eq!(parts[1], "INFO");
    assert_eq!(parts[2], "Saved #1 to a.txt");
}

#[test]
fn multiline_messages_stay_on_one_line() {
    let mut log = AuditLog::in_memory();
    log.error("first\nsecond\r\nthird");
    assert!(!log.records()[0].to_line().contains('\n'));
}

#[test]
fn file_sink_appends_across_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("audit.log");

    {
        let mut log = AuditLog::with_file(&path).unwrap();
        assert_eq!(log.sink_path(), Some(path.as_path()));
        log.info("one");
    }
    {
        let mut log = AuditLog::with_file(&path).unwrap();
        log.error("two");
    }

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - INFO - one"));
    assert!(lines[1].ends_with(" - ERROR - two"));
}
