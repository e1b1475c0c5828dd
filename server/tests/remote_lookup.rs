use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use ordering_core::{Lookup, LookupError};
use ordering_server::remote::{http_client, RemoteLookup, DEFAULT_PREVIEW_PATH, DEFAULT_SEARCH_PATH};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

async fn preview(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let s = params.get("s").cloned().unwrap_or_default();
    Json(json!([
        {"ID": 11, "post_title": format!("{s} one"), "permalink": "https://example.com/one"},
        {"ID": "12", "post_title": format!("{s} two")}
    ]))
}

async fn spawn_site() -> String {
    let site = Router::new()
        .route(&format!("/wp-json{DEFAULT_PREVIEW_PATH}"), get(preview))
        .route(&format!("/wp-json{DEFAULT_SEARCH_PATH}"), get(|| async { (StatusCode::FORBIDDEN, "nope") }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, site).await.unwrap() });
    format!("http://{addr}/wp-json/")
}

#[tokio::test]
async fn fetches_and_decodes_host_posts() {
    let root = spawn_site().await;
    let client = http_client("test-agent", Duration::from_secs(5)).unwrap();
    let lookup = RemoteLookup::new(client, &root, DEFAULT_PREVIEW_PATH).unwrap();

    let posts = lookup.fetch("red shoes").await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, 11);
    assert_eq!(posts[0].title, "red shoes one");
    assert_eq!(posts[0].extra["permalink"], "https://example.com/one");
    assert_eq!(posts[1].id, 12);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let root = spawn_site().await;
    let client = http_client("test-agent", Duration::from_secs(5)).unwrap();
    let lookup = RemoteLookup::new(client, &root, DEFAULT_SEARCH_PATH).unwrap();
    assert_eq!(lookup.fetch("x").await, Err(LookupError::Status { status: 403 }));
}
