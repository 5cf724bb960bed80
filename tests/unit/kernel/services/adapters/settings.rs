use super::*;
use crate::models::DocumentFormat;
use tempfile::tempdir;

#[test]
fn settings_path_ends_with_app_file() {
    if let Some(path) = get_settings_path() {
        assert!(path.ends_with(Path::new(SETTINGS_DIR).join(SETTINGS_FILE)));
    }
}

#[test]
fn load_settings_from_reads_valid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{"workspace_root":"/srv/docs","default_format":"pdf","overwrite_existing":true}"#,
    )
    .unwrap();

    let settings = load_settings_from(&path).expect("settings");
    assert_eq!(settings.workspace_root, Some(PathBuf::from("/srv/docs")));
    assert_eq!(settings.default_format, DocumentFormat::Pdf);
    assert!(settings.overwrite_existing);
}

#[test]
fn load_settings_from_rejects_invalid_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(load_settings_from(&path).is_none());
}

#[test]
fn load_settings_from_missing_file_is_none() {
    let dir = tempdir().unwrap();
    assert!(load_settings_from(&dir.path().join("absent.json")).is_none());
}
