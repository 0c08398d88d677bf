use std::env;
use std::fs::write;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::NamedTempFile;

/// A static config plus the credential env vars produces a merged AppConfig.
#[test]
#[serial]
fn test_load_config_success_injects_env_credentials() {
    let config_yaml = r#"
api:
  base_path: "https://example.zendesk.com/api/v2/help_center"
  category_id: 360002232959
sync:
  source_dir: ./docs
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("HELPDESK_USER", "docs-bot@example.com");
    env::set_var("HELPDESK_PASSWORD", "top-secret-test-password");

    let config =
        helpdesk_sync::load_config::load_config(config_file.path()).expect("Config should load");

    assert_eq!(
        config.api.base_path,
        "https://example.zendesk.com/api/v2/help_center"
    );
    assert_eq!(config.api.category_id, 360002232959);
    assert_eq!(config.api.section_pattern, None);
    assert_eq!(config.source_dir, PathBuf::from("./docs"));

    // Credentials must come directly from the environment.
    assert_eq!(config.api.user, "docs-bot@example.com");
    assert_eq!(config.api.password, "top-secret-test-password");
}

/// The optional section pattern is carried through when present.
#[test]
#[serial]
fn test_load_config_accepts_section_pattern() {
    let config_yaml = r#"
api:
  base_path: "https://example.zendesk.com/api/v2/help_center"
  category_id: 1
  section_pattern: "v[0-9]+\\.[0-9]+"
sync:
  source_dir: ./docs
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::set_var("HELPDESK_USER", "user");
    env::set_var("HELPDESK_PASSWORD", "pass");

    let config =
        helpdesk_sync::load_config::load_config(config_file.path()).expect("Config should load");
    assert_eq!(config.api.section_pattern.as_deref(), Some("v[0-9]+\\.[0-9]+"));
}

/// Missing credential env vars make the loader fail.
#[test]
#[serial]
fn test_load_config_errors_on_missing_env() {
    let config_yaml = r#"
api:
  base_path: "https://example.zendesk.com/api/v2/help_center"
  category_id: 1
sync:
  source_dir: ./docs
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    env::remove_var("HELPDESK_USER");
    env::remove_var("HELPDESK_PASSWORD");

    let err = helpdesk_sync::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();

    assert!(
        msg.contains("HELPDESK_USER") || msg.contains("HELPDESK_PASSWORD"),
        "Must error for missing env var, got: {msg}"
    );
}

/// A config file that is not valid YAML errors and reports as such.
#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    // Provide env so we don't fail early
    env::set_var("HELPDESK_USER", "user");
    env::set_var("HELPDESK_PASSWORD", "pass");

    let err = helpdesk_sync::load_config::load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}
