//! Config file loading tests.

use std::fs;

use specdrafter::config::Config;
use specdrafter::{DirectiveDisplay, DrafterClient};

#[test]
fn load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
            [api]
            base_url = "http://drafter.internal:8000/"
            request_timeout_secs = 3

            [chat]
            directive_display = "keep"
        "#,
    )
    .unwrap();

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.api.request_timeout_secs, 3);
    assert_eq!(config.chat.directive_display, DirectiveDisplay::Keep);

    let client = DrafterClient::from_config(&config.api).unwrap();
    assert_eq!(client.base_url(), "http://drafter.internal:8000");
}

#[test]
fn invalid_toml_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[api\nbase_url = ").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn unknown_display_policy_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[chat]\ndirective_display = \"hide\"\n").unwrap();

    assert!(Config::load_from_file(&path).is_err());
}
