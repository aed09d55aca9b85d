use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use trivia_hub_back::{
    build_router,
    config::AppConfig,
    state::{AppState, contest::ContestSettings},
};

fn app() -> Router {
    let config = AppConfig::default().with_contest(ContestSettings {
        n_rounds: 3,
        ..ContestSettings::default()
    });
    build_router(AppState::new(config))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn healthcheck_reports_degraded_without_store() {
    let app = app();
    let (status, body) = call(&app, "GET", "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["connected_clients"], 0);
}

#[tokio::test]
async fn answer_workflow_bumps_versions_and_credits_question() {
    let app = app();

    let (status, ack) = call(
        &app,
        "POST",
        "/rpc/open_question",
        Some(json!({ "user": "alice", "round": 1, "question": 1, "value": 10, "text": "Capital of France?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["versions"], json!([1, 0, 0]));

    let (_, ack) = call(
        &app,
        "POST",
        "/rpc/propose_answer",
        Some(json!({ "user": "sam", "question": 1, "text": "Paris", "confidence": 4 })),
    )
    .await;
    assert_eq!(ack["queue_index"], 0);

    let (status, _) = call(
        &app,
        "POST",
        "/rpc/call_in",
        Some(json!({ "user": "carol", "queue_index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, ack) = call(
        &app,
        "POST",
        "/rpc/mark_correct",
        Some(json!({ "caller": "carol", "operator": "olly", "queue_index": 0 })),
    )
    .await;
    assert_eq!(ack["versions"], json!([4, 0, 0]));

    let (status, contest) = call(&app, "GET", "/rpc/contest", None).await;
    assert_eq!(status, StatusCode::OK);
    let round = &contest["rounds"][0];
    assert_eq!(round["earned"], 10);
    assert_eq!(round["questions"][0]["correct"], true);
    assert_eq!(round["questions"][0]["is_open"], false);
    assert_eq!(round["answers"][0]["status"], "correct");
    assert_eq!(contest["earned"], 10);
}

#[tokio::test]
async fn sync_returns_only_rounds_the_caller_lacks() {
    let app = app();
    call(
        &app,
        "POST",
        "/rpc/set_show_name",
        Some(json!({ "user": "alice", "round": 2, "text": "Science" })),
    )
    .await;

    let (status, diff) = call(&app, "POST", "/rpc/sync", Some(json!({ "known_versions": [] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(diff["versions"], json!([0, 1, 0]));
    assert_eq!(diff["rounds"].as_array().unwrap().len(), 1);
    assert_eq!(diff["rounds"][0]["show_name"], "Science");

    let (_, diff) = call(
        &app,
        "POST",
        "/rpc/sync",
        Some(json!({ "known_versions": [0, 1, 0] })),
    )
    .await;
    assert!(diff["rounds"].as_array().unwrap().is_empty());
    assert_eq!(diff["header"]["current_round"], 1);
}

#[tokio::test]
async fn rejected_operations_map_to_http_errors_and_leave_state_alone() {
    let app = app();

    let (status, body) = call(
        &app,
        "POST",
        "/rpc/open_question",
        Some(json!({ "user": "alice", "round": 2, "question": 1, "value": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("round"));

    let (status, _) = call(
        &app,
        "POST",
        "/rpc/mark_incorrect",
        Some(json!({ "user": "alice", "queue_index": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    call(
        &app,
        "POST",
        "/rpc/open_question",
        Some(json!({ "user": "alice", "round": 1, "question": 2, "value": 5 })),
    )
    .await;
    let (status, _) = call(&app, "POST", "/rpc/set_speed", Some(json!({ "user": "alice" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, "POST", "/rpc/new_round", Some(json!({ "user": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, versions) = call(&app, "GET", "/rpc/versions", None).await;
    assert_eq!(versions["versions"], json!([1, 0, 0]));
}

#[tokio::test]
async fn users_endpoint_lists_recent_callers_with_roles() {
    let app = app();
    call(
        &app,
        "POST",
        "/rpc/users/role",
        Some(json!({ "user": "carol", "role": "caller" })),
    )
    .await;
    call(&app, "POST", "/rpc/new_round", Some(json!({ "user": "alice" }))).await;

    let (status, users) = call(&app, "GET", "/rpc/users?window_secs=60", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users["window_secs"], 60);
    let names: Vec<_> = users["active"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| (user["name"].as_str().unwrap().to_string(), user["role"].clone()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("alice".to_string(), json!("researcher")),
            ("carol".to_string(), json!("caller")),
        ]
    );
}

#[tokio::test]
async fn saves_are_unavailable_in_degraded_mode() {
    let app = app();
    let (status, body) = call(&app, "GET", "/rpc/saves", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].as_str().unwrap().contains("degraded"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app();
    let (status, doc) = call(&app, "GET", "/api-doc/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/rpc/mark_correct"]["post"].is_object());
}
