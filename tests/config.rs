//! Settings snapshot behavior: env capture, file layering, and
//! case-insensitive lookup. Env-touching tests are serialized because the
//! process environment is shared.

use fnboot::{Settings, SettingsError};
use serial_test::serial;
use std::io::Write;

fn write_temp_settings(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
#[serial]
fn test_env_snapshot_is_case_insensitive() {
    std::env::set_var("FNBOOT_IT_REGION", "eu-west-1");

    let settings = Settings::from_env();

    assert_eq!(settings.get("fnboot_it_region"), Some("eu-west-1"));
    assert_eq!(settings.get("FNBOOT_IT_REGION"), Some("eu-west-1"));
    assert!(settings.is_set("Fnboot_It_Region"));

    std::env::remove_var("FNBOOT_IT_REGION");
}

#[test]
#[serial]
fn test_snapshot_does_not_track_later_env_changes() {
    std::env::set_var("FNBOOT_IT_SNAPSHOT", "before");
    let settings = Settings::from_env();
    std::env::set_var("FNBOOT_IT_SNAPSHOT", "after");

    assert_eq!(settings.get("FNBOOT_IT_SNAPSHOT"), Some("before"));

    std::env::remove_var("FNBOOT_IT_SNAPSHOT");
}

#[test]
#[serial]
fn test_file_values_with_env_override() {
    let path = write_temp_settings(
        "fnboot_it_flat.json",
        r#"{"Storage_Account": "from-file", "Fnboot_It_Only_File": "file-value"}"#,
    );

    std::env::set_var("STORAGE_ACCOUNT", "from-env");

    let settings = Settings::from_env_and_file(&path).unwrap();

    // Environment wins on conflicts; file fills the gaps.
    assert_eq!(settings.get("storage_account"), Some("from-env"));
    assert_eq!(settings.get("fnboot_it_only_file"), Some("file-value"));

    std::env::remove_var("STORAGE_ACCOUNT");
    std::fs::remove_file(path).ok();
}

#[test]
#[serial]
fn test_values_object_layout() {
    let path = write_temp_settings(
        "fnboot_it_values.json",
        r#"{"IsEncrypted": false, "Values": {"Fnboot_It_Queue": "orders", "Fnboot_It_Batch": 16}}"#,
    );

    let settings = Settings::from_env_and_file(&path).unwrap();

    assert_eq!(settings.get("fnboot_it_queue"), Some("orders"));
    // Non-string JSON values are rendered as text.
    assert_eq!(settings.get("fnboot_it_batch"), Some("16"));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_missing_file_is_io_error() {
    let result = Settings::from_env_and_file("/nonexistent/fnboot-settings.json");
    assert!(matches!(result, Err(SettingsError::Io(_))));
}

#[test]
fn test_non_object_file_is_rejected() {
    let path = write_temp_settings("fnboot_it_array.json", r#"[1, 2, 3]"#);

    let result = Settings::from_env_and_file(&path);
    assert!(matches!(result, Err(SettingsError::NotAnObject)));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_malformed_json_is_json_error() {
    let path = write_temp_settings("fnboot_it_bad.json", "{not json");

    let result = Settings::from_env_and_file(&path);
    assert!(matches!(result, Err(SettingsError::Json(_))));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_get_or_fallback() {
    let settings = Settings::default();
    assert!(settings.is_empty());
    assert_eq!(settings.get_or("fnboot_it_absent", "fallback"), "fallback");
}
