use httpmock::prelude::*;
use participant_unregister::core::document::lock_document;
use participant_unregister::utils::validation::Validate;
use participant_unregister::{
    render_participant_list, ClickDisposition, ClickEvent, DeleteClickHandler, Document,
    HandlerConfig, HttpUnregisterApi, RecordingNotifier, SettingsProvider, UnregisterOutcome,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_handler_follows_configured_dom_contract() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/school/unregister")
                .query_param("email", "c@example.com");
            then.status(200).json_body(serde_json::json!({"success": false}));
        })
        .await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[server]
base_url = "{}/school"
timeout_seconds = 5

[handler]
marker_class = "remove-participant"
email_attribute = "data-participant"

[messages]
unregister_failed = "Could not remove this participant."
"#,
        server.base_url()
    )
    .unwrap();

    let config = HandlerConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();
    let settings = config.handler_settings();

    let mut doc = Document::new();
    let root = doc.root();
    let items =
        render_participant_list(&mut doc, root, &["c@example.com".to_string()], &settings).unwrap();
    let button = doc
        .find_by_attribute("data-participant", "c@example.com")
        .unwrap();
    assert!(doc.has_class(button, "remove-participant"));
    assert!(!doc.has_class(button, "delete-btn"));
    let document = doc.into_shared();

    let notifier = Arc::new(RecordingNotifier::default());
    let handler = DeleteClickHandler::new(
        document.clone(),
        Arc::new(HttpUnregisterApi::from_settings(&config).unwrap()),
        notifier.clone(),
        settings,
    )
    .unwrap();

    assert!(matches!(
        handler.on_click(&ClickEvent::on(button)),
        ClickDisposition::Dispatched(_)
    ));
    let outcomes = handler.settle().await;

    api_mock.assert_async().await;
    assert!(matches!(outcomes[0], UnregisterOutcome::Rejected { .. }));
    assert_eq!(
        notifier.alerts(),
        vec!["Could not remove this participant.".to_string()]
    );
    assert!(lock_document(&document).is_connected(items[0]));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[server\nbase_url = ").unwrap();
    assert!(HandlerConfig::from_file(file.path()).is_err());

    assert!(HandlerConfig::from_file("/definitely/not/here.toml").is_err());
}
