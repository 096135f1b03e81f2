#![allow(clippy::unwrap_used, clippy::expect_used)]

use fro_admin::{
    app_lib::{FileStorage, KeyValueStore, Theme},
    cli::{
        actions::{preferences, referentials, Action},
        commands::client::Options,
        globals::GlobalArgs,
    },
    features::referentials::ReferentialSearchForm,
};
use std::path::Path;

fn globals(state_file: &Path) -> GlobalArgs {
    GlobalArgs::new(Options {
        api_url: Some("http://127.0.0.1:9/api".to_string()),
        timeout_ms: Some(500),
        state_file: Some(state_file.to_path_buf()),
        locale: None,
    })
}

#[tokio::test]
async fn theme_and_locale_are_written_to_the_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");

    Action::Preferences(preferences::Args {
        globals: globals(&state_file),
        command: preferences::Command::Theme(Some(Theme::Dark)),
    })
    .execute()
    .await
    .unwrap();
    Action::Preferences(preferences::Args {
        globals: globals(&state_file),
        command: preferences::Command::Locale(Some("fr".to_string())),
    })
    .execute()
    .await
    .unwrap();

    let storage = FileStorage::open(&state_file);
    assert_eq!(storage.get("app-theme").as_deref(), Some("dark"));
    assert_eq!(storage.get("app-locale").as_deref(), Some("fr"));
}

#[tokio::test]
async fn unsupported_locale_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");

    let result = Action::Preferences(preferences::Args {
        globals: globals(&state_file),
        command: preferences::Command::Locale(Some("xx".to_string())),
    })
    .execute()
    .await;

    assert!(result.is_err());
    assert!(FileStorage::open(&state_file).get("app-locale").is_none());
}

#[tokio::test]
async fn referential_commands_require_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");

    let result = Action::Referentials(referentials::Args {
        globals: globals(&state_file),
        command: referentials::Command::Search {
            form: ReferentialSearchForm::default(),
            json: true,
        },
    })
    .execute()
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("fro-admin login"));
}
