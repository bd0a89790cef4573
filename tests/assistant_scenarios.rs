use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use recon_assistant::api::{ChatClient, FALLBACK_REPLY};
use recon_assistant::assistant::{Assistant, SubmitError, ViewState, SUGGESTED_QUESTIONS};
use recon_assistant::clock::ManualClock;
use recon_assistant::conversation::{MessageStore, Sender, STORAGE_KEY};
use recon_assistant::markdown::{render, Fragment};
use recon_assistant::storage::{KeyValueStore, SqliteStore};
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    ))
}

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(Url::parse(&format!("{}/chat", server.uri())).unwrap(), None).unwrap()
}

#[tokio::test]
async fn suggestion_chip_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "query": "How many datanodes are in the cluster?" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "response": "There are **5** datanodes." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut assistant = Assistant::new(MessageStore::in_memory(), clock());
    let chip = assistant.suggestions().expect("empty state shows suggestions")[0];
    assistant.submit(&client_for(&server), chip).await.unwrap();

    let messages = assistant.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "How many datanodes are in the cluster?");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(
        render(&messages[1].text),
        vec![
            Fragment::Text("There are ".into()),
            Fragment::Strong("5".into()),
            Fragment::Text(" datanodes.".into()),
        ]
    );
    assert_eq!(assistant.state(), ViewState::Idle);
}

#[tokio::test]
async fn server_error_yields_fallback_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut assistant = Assistant::new(MessageStore::in_memory(), clock());
    assistant
        .submit(&client_for(&server), "Are there any unhealthy containers?")
        .await
        .unwrap();

    let messages = assistant.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "Are there any unhealthy containers?");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].text, FALLBACK_REPLY);
    assert_eq!(assistant.state(), ViewState::Idle);
}

#[tokio::test]
async fn whitespace_submission_changes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut assistant = Assistant::new(MessageStore::in_memory(), clock());
    let err = assistant.submit(&client_for(&server), "   ").await.unwrap_err();
    assert_eq!(err, SubmitError::EmptyQuery);
    assert!(assistant.is_empty());
}

#[tokio::test]
async fn history_survives_restart_in_sqlite() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "42 open keys." })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("assistant.sqlite");

    let first_messages = {
        let store = MessageStore::hydrate(Box::new(SqliteStore::open(&db).unwrap()));
        let mut assistant = Assistant::new(store, clock());
        assistant
            .submit(&client_for(&server), SUGGESTED_QUESTIONS[4])
            .await
            .unwrap();
        assistant
            .submit(&client_for(&server), "And closed ones?")
            .await
            .unwrap();
        assistant.messages().to_vec()
    };
    assert_eq!(first_messages.len(), 4);

    let store = MessageStore::hydrate(Box::new(SqliteStore::open(&db).unwrap()));
    let mut reloaded = Assistant::new(store, clock());
    assert_eq!(reloaded.messages(), first_messages.as_slice());
    assert!(reloaded.suggestions().is_none());

    reloaded.clear().unwrap();
    let raw = SqliteStore::open(&db).unwrap();
    assert_eq!(raw.get(STORAGE_KEY).unwrap(), None);
}
