//! End-to-end tests for the HTTP surface, driven through the router without
//! binding a socket.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use booklib::app;
use booklib::db::Database;
use booklib::handler::AppState;
use booklib::model::Book;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Database::in_memory().await.expect("in-memory database");
    app(AppState { db: Arc::new(db) })
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_healthcheck() {
    let app = test_app().await;
    let (status, body) = send(&app, empty_request("GET", "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_process_url_all() {
    let app = test_app().await;
    let body = r#"{"url":"https://BYFOOD.com/food-EXPeriences?query=abc/","operation":"all"}"#;
    let (status, body) = send(&app, json_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"processed_url": "https://www.byfood.com/food-experiences"}));
}

#[tokio::test]
async fn test_process_url_canonical() {
    let app = test_app().await;
    let body = r#"{"url":"https://BYFOOD.com/food-EXPeriences?query=abc/","operation":"canonical"}"#;
    let (status, body) = send(&app, json_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"processed_url": "https://BYFOOD.com/food-EXPeriences"}));
}

#[tokio::test]
async fn test_process_url_invalid_body() {
    let app = test_app().await;
    let (status, body) = send(&app, json_request("POST", "/process-url", "invalid json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_process_url_ignores_content_type() {
    let app = test_app().await;
    let body = r#"{"url":"https://BYFOOD.com/a/","operation":"all"}"#;

    let (status, json) = send(&app, form_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"processed_url": "https://www.byfood.com/a"}));

    let req = Request::builder()
        .method("POST")
        .uri("/process-url")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_process_url_relative_and_spaces() {
    let app = test_app().await;

    let body = r#"{"url":"byfood.com/Menu/","operation":"all"}"#;
    let (status, json) = send(&app, json_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed_url"], "https://www.byfood.com/byfood.com/menu");

    let body = r#"{"url":"https://byfood.com/a b/","operation":"canonical"}"#;
    let (status, json) = send(&app, json_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed_url"], "https://byfood.com/a%20b");
}

#[tokio::test]
async fn test_process_url_missing_fields() {
    let app = test_app().await;
    let (status, body) = send(&app, json_request("POST", "/process-url", r#"{"url":"https://a.io"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing url or operation");
}

#[tokio::test]
async fn test_process_url_unknown_operation() {
    let app = test_app().await;
    let body = r#"{"url":"https://example.com/a/","operation":"bogus"}"#;
    let (status, body) = send(&app, json_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("bogus"));
}

#[tokio::test]
async fn test_process_url_malformed_url() {
    let app = test_app().await;
    let body = r#"{"url":"https://exa mple.com","operation":"canonical"}"#;
    let (status, _) = send(&app, json_request("POST", "/process-url", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_books_crud() {
    let app = test_app().await;

    let (status, body) = send(&app, empty_request("GET", "/books")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let payload = r#"{"title":"Les Misérables","author":"Victor Hugo","year":1862}"#;
    let (status, body) = send(&app, json_request("POST", "/books", payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Book = serde_json::from_value(body).unwrap();
    assert!(created.id > 0);
    assert_eq!(created.author, "Victor Hugo");

    let uri = format!("/books/{}", created.id);
    let (status, body) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_value::<Book>(body).unwrap(), created);

    let payload = r#"{"title":"Les Misérables","author":"Victor Hugo","year":1862,"detail":"Five volumes"}"#;
    let (status, body) = send(&app, json_request("PUT", &uri, payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Five volumes");
    assert_eq!(body["id"], created.id);

    let (status, body) = send(&app, empty_request("GET", "/books")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn test_books_validation() {
    let app = test_app().await;

    let (status, body) = send(&app, json_request("POST", "/books", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON provided");

    let (status, body) = send(&app, json_request("POST", "/books", r#"{"title":"Dune","author":""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let (status, body) = send(&app, empty_request("GET", "/books/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid book id");
}

#[tokio::test]
async fn test_books_accept_json_without_json_content_type() {
    let app = test_app().await;
    let payload = r#"{"title":"Dune","author":"Frank Herbert","year":1965}"#;

    let (status, body) = send(&app, form_request("POST", "/books", payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Book = serde_json::from_value(body).unwrap();

    let payload = r#"{"title":"Dune","author":"Frank Herbert","year":1965,"detail":"Arrakis"}"#;
    let uri = format!("/books/{}", created.id);
    let (status, body) = send(&app, form_request("PUT", &uri, payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Arrakis");

    let (status, body) = send(&app, form_request("POST", "/books", "title=Dune")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON provided");
}

#[tokio::test]
async fn test_books_missing_id() {
    let app = test_app().await;
    let payload = r#"{"title":"Dune","author":"Frank Herbert","year":1965}"#;

    let (status, _) = send(&app, json_request("PUT", "/books/42", payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request("DELETE", "/books/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_books_search() {
    let app = test_app().await;
    for payload in [
        r#"{"title":"Emma","author":"Jane Austen","year":1815}"#,
        r#"{"title":"Dune","author":"Frank Herbert","year":1965}"#,
    ] {
        let (status, _) = send(&app, json_request("POST", "/books", payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, empty_request("GET", "/books?q=austen")).await;
    assert_eq!(status, StatusCode::OK);
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Emma");
}
