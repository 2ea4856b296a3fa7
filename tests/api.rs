mod common;

use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use hyper::Body;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use safepaste::commands::serve::router;
use safepaste::store::MemoryStore;
use safepaste::types::api::{
    CreatedPaste, PasteSummary, PasteView, ViewCount, DELETE_KEY_HEADER, PASSWORD_HEADER,
};
use safepaste::App;

const BASE_URL: &str = "https://paste.example.com";

fn app() -> Router {
    router(common::app(BASE_URL))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    let body = body.to_string();
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str, password: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(password) = password {
        builder = builder.header(PASSWORD_HEADER, password);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, password: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(password) = password {
        builder = builder.header(PASSWORD_HEADER, password);
    }
    builder.body(Body::empty()).unwrap()
}

fn delete(uri: &str, delete_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(delete_key) = delete_key {
        builder = builder.header(DELETE_KEY_HEADER, delete_key);
    }
    builder.body(Body::empty()).unwrap()
}

async fn create(app: &Router, body: Value) -> CreatedPaste {
    let (status, body) = send(app, post_json("/api/pastes", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn index_serves_the_manual() {
    let (status, body) = send(&app(), get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("SAFEPASTE(1)"));
}

#[tokio::test]
async fn create_then_fetch() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/pastes",
            json!({ "title": "notes", "content": "Y2lwaGVy", "format": "markdown" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_owned();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let created: CreatedPaste = serde_json::from_slice(&body).unwrap();

    assert_eq!(location, format!("/safe-paste/{}", created.id));
    assert_eq!(created.path, location);
    assert_eq!(created.url, format!("{BASE_URL}{location}"));
    assert!(created.expires_at.is_some());

    for uri in [format!("/api/pastes/{}", created.id), location] {
        let (status, body) = send(&app, get(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        let view: PasteView = serde_json::from_slice(&body).unwrap();
        assert_eq!(view.title, "notes");
        assert_eq!(view.content, "Y2lwaGVy");
        assert_eq!(view.views, 0);
        assert!(!view.password_protected);
    }
}

#[tokio::test]
async fn empty_content_is_rejected() {
    let (status, _) = send(&app(), post_json("/api/pastes", json!({ "content": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_paste_is_not_found() {
    let (status, _) = send(&app(), get("/api/pastes/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn password_gate_statuses() {
    let app = app();
    let created = create(&app, json!({ "content": "ct", "password": "hunter2" })).await;
    let uri = format!("/api/pastes/{}", created.id);

    assert_eq!(send(&app, get(&uri, None)).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, get(&uri, Some("nope"))).await.0, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, get(&uri, Some("hunter2"))).await;
    assert_eq!(status, StatusCode::OK);
    let view: PasteView = serde_json::from_slice(&body).unwrap();
    assert!(view.password_protected);
    assert!(!String::from_utf8(body).unwrap().contains("hunter2"));
}

#[tokio::test]
async fn views_are_counted_per_request() {
    let app = app();
    let created = create(&app, json!({ "content": "ct" })).await;
    let uri = format!("/api/pastes/{}/views", created.id);

    for expected in 1..=3 {
        let (status, body) = send(&app, post(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        let count: ViewCount = serde_json::from_slice(&body).unwrap();
        assert_eq!(count.views, expected);
    }
}

#[tokio::test]
async fn burn_only_applies_to_burn_after_reading() {
    let app = app();
    let kept = create(&app, json!({ "content": "ct" })).await;
    let (status, _) = send(&app, post(&format!("/api/pastes/{}/burn", kept.id), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let burning = create(&app, json!({ "content": "ct", "burn_after_reading": true })).await;
    let (status, _) = send(&app, post(&format!("/api/pastes/{}/burn", burning.id), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/pastes/{}", burning.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_the_delete_key() {
    let app = app();
    let created = create(&app, json!({ "content": "ct" })).await;
    let uri = format!("/api/pastes/{}", created.id);

    assert_eq!(send(&app, delete(&uri, None)).await.0, StatusCode::BAD_REQUEST);
    assert_eq!(
        send(&app, delete(&uri, Some("wrong"))).await.0,
        StatusCode::FORBIDDEN
    );
    let same_length = "x".repeat(created.delete_key.len());
    assert_eq!(
        send(&app, delete(&uri, Some(&same_length))).await.0,
        StatusCode::FORBIDDEN
    );

    // the key is only read from its header, never from the query string
    let in_query = format!("{uri}?delete_key={}", created.delete_key);
    assert_eq!(send(&app, delete(&in_query, None)).await.0, StatusCode::BAD_REQUEST);

    let key = Some(created.delete_key.as_str());
    assert_eq!(send(&app, delete(&uri, key)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, delete(&uri, key)).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_shows_public_pastes_only() {
    let app = app();
    create(&app, json!({ "title": "shared", "content": "ct", "visibility": "public" })).await;
    create(&app, json!({ "title": "hidden", "content": "ct" })).await;
    create(&app, json!({ "title": "private", "content": "ct", "visibility": "private" })).await;

    let (status, body) = send(&app, get("/api/pastes", None)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<PasteSummary> = serde_json::from_slice(&body).unwrap();
    let titles: Vec<_> = listed.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["shared"]);
    assert!(!String::from_utf8(body).unwrap().contains("\"content\""));

    let (_, body) = send(&app, get("/api/pastes?q=nothing", None)).await;
    let listed: Vec<PasteSummary> = serde_json::from_slice(&body).unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn oversized_uploads_are_refused() {
    let app = router(App {
        config: common::config(BASE_URL, 64),
        store: MemoryStore::new().into(),
    });
    let (status, _) = send(
        &app,
        post_json("/api/pastes", json!({ "content": "x".repeat(1024) })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
