// E2E tests for chat CRUD, message listing, feedback and analytics events
mod common;

use common::*;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_create_chat_defaults_title() {
    let app = setup_test_server();

    let response = app.server.post("/v1/chats").json(&json!({})).await;
    assert_eq!(response.status_code(), 201);
    let chat: serde_json::Value = response.json();
    assert_eq!(chat["title"], "New Chat");
    assert!(uuid::Uuid::parse_str(chat["id"].as_str().unwrap()).is_ok());

    // No body at all is accepted too
    let response = app.server.post("/v1/chats").await;
    assert_eq!(response.status_code(), 201);

    let response = app
        .server
        .post("/v1/chats")
        .json(&json!({"title": "Biology"}))
        .await;
    let chat: serde_json::Value = response.json();
    assert_eq!(chat["title"], "Biology");
}

#[tokio::test]
async fn test_list_chats_most_recent_first() {
    let app = setup_test_server();

    for title in ["older", "newer"] {
        app.server
            .post("/v1/chats")
            .json(&json!({ "title": title }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let chats: Vec<serde_json::Value> = app.server.get("/v1/chats").await.json();
    let titles: Vec<&str> = chats.iter().map(|c| c["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["newer", "older"]);
}

#[tokio::test]
async fn test_asking_moves_chat_to_top() {
    let app = setup_test_server();

    let first = ask(&app.server, json!({"message": "first chat"})).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    ask(&app.server, json!({"message": "second chat"})).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    ask(
        &app.server,
        json!({"chatId": conversation_id(&first), "message": "back to the first"}),
    )
    .await;

    let chats: Vec<serde_json::Value> = app.server.get("/v1/chats").await.json();
    assert_eq!(chats[0]["title"], "first chat");
}

#[tokio::test]
async fn test_delete_chat_validation_and_cascade() {
    let app = setup_test_server();

    let response = app.server.delete("/v1/chats").await;
    assert_eq!(response.status_code(), 400);

    let response = app.server.delete("/v1/chats?id=not-a-uuid").await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .delete(&format!("/v1/chats?id={}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);

    let events = ask(&app.server, json!({"message": "to be deleted"})).await;
    let chat_id = conversation_id(&events);

    let response = app.server.delete(&format!("/v1/chats?id={chat_id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({"id": chat_id, "deleted": true}));

    let messages: Vec<serde_json::Value> = app
        .server
        .get(&format!("/v1/messages?chatId={chat_id}"))
        .await
        .json();
    assert!(messages.is_empty());
    assert_eq!(app.store.turn_count().await, 0);
}

#[tokio::test]
async fn test_list_messages_validation() {
    let app = setup_test_server();

    let response = app.server.get("/v1/messages").await;
    assert_eq!(response.status_code(), 400);
    let error: serde_json::Value = response.json();
    assert_eq!(error["error"]["param"], "chatId");

    let response = app.server.get("/v1/messages?chatId=abc").await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .get(&format!("/v1/messages?chatId={}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status_ok();
    let messages: Vec<serde_json::Value> = response.json();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_feedback_on_assistant_message() {
    let app = setup_test_server();

    let events = ask(&app.server, json!({"message": "Rate me"})).await;
    let messages: Vec<serde_json::Value> = app
        .server
        .get(&format!("/v1/messages?chatId={}", conversation_id(&events)))
        .await
        .json();
    let answer_id = messages[1]["id"].as_str().unwrap();

    let response = app
        .server
        .post("/v1/messages")
        .json(&json!({"messageId": answer_id, "type": "like", "comment": "  helpful  "}))
        .await;
    assert_eq!(response.status_code(), 201);
    let feedback: serde_json::Value = response.json();
    assert_eq!(feedback["messageId"], answer_id);
    assert_eq!(feedback["type"], "like");
    assert_eq!(feedback["comment"], "helpful");

    app.server
        .post("/v1/messages")
        .json(&json!({"messageId": answer_id, "type": "dislike"}))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    assert_eq!(app.store.feedback_counts().await, (1, 1));
}

#[tokio::test]
async fn test_feedback_validation() {
    let app = setup_test_server();

    let response = app
        .server
        .post("/v1/messages")
        .json(&json!({"messageId": uuid::Uuid::new_v4().to_string(), "type": "like"}))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .server
        .post("/v1/messages")
        .json(&json!({"messageId": "abc", "type": "like"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .post("/v1/messages")
        .json(&json!({"messageId": uuid::Uuid::new_v4().to_string(), "type": "love"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app.server.post("/v1/messages").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_record_events() {
    let app = setup_test_server();

    let response = app
        .server
        .post("/v1/events")
        .json(&json!({"name": "page_view", "properties": {"path": "/"}}))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = app.server.post("/v1/events").json(&json!({"name": ""})).await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .post("/v1/events")
        .json(&json!({"name": "click", "properties": [1, 2]}))
        .await;
    assert_eq!(response.status_code(), 400);

    // Every ask records one event of its own
    ask(&app.server, json!({"message": "hi"})).await;
    assert_eq!(app.store.event_count().await, 2);
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_server();

    let health: serde_json::Value = app.server.get("/v1/health").await.json();
    assert_eq!(health["status"], "ok");

    let response = app.server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(
        response.header("referrer-policy"),
        "strict-origin-when-cross-origin"
    );
    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/v1/ask"]["post"].is_object());
}
