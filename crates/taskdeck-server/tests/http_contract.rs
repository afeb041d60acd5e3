use std::net::SocketAddr;

use chrono::Utc;
use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use taskdeck_server::AppState;
use tokio::net::TcpListener;

struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
}

async fn spawn(state: AppState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(taskdeck_server::serve(listener, state, std::future::pending()));
    TestServer {
        addr,
        client: reqwest::Client::new(),
    }
}

async fn seeded_app() -> TestServer {
    spawn(AppState::seeded(Utc::now(), chrono_tz::UTC)).await
}

async fn send(app: &TestServer, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let method = Method::from_bytes(method.as_bytes()).expect("method");
    let mut request = app
        .client
        .request(method, format!("http://{}{path}", app.addr));
    if let Some(value) = body {
        request = request.json(&value);
    }
    let response = request.send().await.expect("server responds");
    let status = response.status();
    let bytes = response.bytes().await.expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn get_lists_seeded_tasks_in_store_order() {
    let app = seeded_app().await;
    let (status, body) = send(&app, "GET", "/api/tasks", None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|task| task["id"].as_str().expect("string id"))
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(body[1]["isCompleted"], json!(true));
}

#[tokio::test]
async fn post_creates_and_prepends() {
    let app = seeded_app().await;
    let (status, created) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({
            "title": "Type Task Title",
            "description": "",
            "dueDate": "2024-01-12T00:00:00.000Z"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["isCompleted"], json!(false));
    assert_eq!(created["dueDate"], json!("2024-01-12T00:00:00.000Z"));

    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(listed[0]["id"], created["id"]);
    assert_eq!(listed.as_array().expect("array").len(), 4);
}

#[tokio::test]
async fn post_without_title_is_a_bad_request() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "description": "orphan" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error text").contains("title"));

    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(listed.as_array().expect("array").len(), 3);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = seeded_app().await;
    let response = app
        .client
        .post(format!("http://{}/api/tasks", app.addr))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("server responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn healthz_answers_ok() {
    let app = spawn(AppState::empty()).await;
    let body = app
        .client
        .get(format!("http://{}/healthz", app.addr))
        .send()
        .await
        .expect("server responds")
        .text()
        .await
        .expect("text body");
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn put_merges_and_tolerates_unknown_ids() {
    let app = seeded_app().await;
    let (status, body) = send(
        &app,
        "PUT",
        "/api/tasks",
        Some(json!({ "id": "1", "updates": { "isCompleted": true } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/tasks",
        Some(json!({ "id": "nope", "updates": { "title": "ghost" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(listed[0]["isCompleted"], json!(true));
    assert_eq!(listed[0]["title"], json!("Complete project proposal"));
}

#[tokio::test]
async fn put_with_null_due_date_clears_it() {
    let app = seeded_app().await;
    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert!(listed[1]["dueDate"].is_string());

    let (status, _) = send(
        &app,
        "PUT",
        "/api/tasks",
        Some(json!({ "id": "2", "updates": { "title": "Team sync" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert!(listed[1]["dueDate"].is_string());

    let (status, _) = send(
        &app,
        "PUT",
        "/api/tasks",
        Some(json!({ "id": "2", "updates": { "dueDate": null } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(listed[1]["id"], json!("2"));
    assert_eq!(listed[1]["dueDate"], Value::Null);
    assert_eq!(listed[1]["title"], json!("Team sync"));
}

#[tokio::test]
async fn delete_twice_succeeds_both_times() {
    let app = seeded_app().await;
    for _ in 0..2 {
        let (status, body) =
            send(&app, "DELETE", "/api/tasks", Some(json!({ "id": "3" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }

    let (_, listed) = send(&app, "GET", "/api/tasks", None).await;
    assert!(
        listed
            .as_array()
            .expect("array")
            .iter()
            .all(|task| task["id"] != json!("3"))
    );
}

#[tokio::test]
async fn inbox_lists_and_accepts_messages() {
    let app = seeded_app().await;
    let (status, body) = send(&app, "GET", "/api/inbox", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chats"][0]["id"], json!(4));

    let (status, body) = send(
        &app,
        "POST",
        "/api/inbox",
        Some(json!({ "chatId": 1, "message": "Sounds good" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"]["sender"], json!("You"));
    assert_eq!(body["chat"]["content"], json!("Sounds good"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/inbox",
        Some(json!({ "chatId": 77, "message": "hello?" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/api/inbox", Some(json!({ "chatId": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
