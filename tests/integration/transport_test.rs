//! Tests for the HTTP query service against a canned local server.

use super::server::{serve, Reply};
use pretty_assertions::assert_eq;
use querydeck::api::{HttpQueryService, QueryRequest, QueryService, TransportError};
use querydeck::config::ServerConfig;
use serde_json::{json, Value};

const CATALOG: &str = r#"{
    "users": {
        "relation": {
            "id": { "type": "int", "key": "primary" },
            "name": { "type": "varchar", "length": 32 }
        },
        "indexes": { "primary": { "index": "bplus", "filename": "users.dat" } }
    }
}"#;

fn client(url: &str) -> HttpQueryService {
    HttpQueryService::new(&ServerConfig::new(url)).unwrap()
}

#[tokio::test]
async fn test_list_tables_decodes_catalog() {
    let (url, handle) = serve(vec![Reply::json(CATALOG)]).await;

    let catalog = client(&url).list_tables().await.unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["users"]);
    assert_eq!(
        catalog.entry("users").unwrap()["relation"]["name"]["length"],
        json!(32)
    );

    let received = handle.await.unwrap();
    assert_eq!(received[0].method, "GET");
    assert_eq!(received[0].path, "/tables");
    assert_eq!(received[0].header("accept"), Some("application/json"));
}

#[tokio::test]
async fn test_list_tables_accepts_name_list() {
    let (url, _handle) = serve(vec![Reply::json(r#"["users", "places"]"#)]).await;

    let catalog = client(&url).list_tables().await.unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["users", "places"]);
}

#[tokio::test]
async fn test_server_error_is_status() {
    let (url, _handle) = serve(vec![Reply::status(500, r#"{"detail": "boom"}"#)]).await;

    let result = client(&url).list_tables().await;
    assert_eq!(result, Err(TransportError::Status(500)));
}

#[tokio::test]
async fn test_malformed_body_is_fault() {
    let (url, _handle) = serve(vec![Reply::json("{ not json")]).await;

    let result = client(&url).execute(&QueryRequest::new("SELECT 1")).await;
    assert!(matches!(result, Err(TransportError::Fault(_))));
}

#[tokio::test]
async fn test_execute_posts_content_as_json() {
    let body = json!({
        "ok": true,
        "results": [{ "ok": true, "data": [{ "id": 1 }], "meta": { "time_ms": 2.5 } }],
        "stats": { "time_ms": 3 }
    });
    let (url, handle) = serve(vec![Reply::json(body.to_string())]).await;

    let query = "  SELECT *\nFROM users ; ";
    let outcome = client(&url)
        .execute(&QueryRequest::new(query))
        .await
        .unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.total_time_ms(), Some(3.0));
    assert_eq!(outcome.first().unwrap().meta.time_ms, Some(2.5));

    let received = handle.await.unwrap();
    let request = &received[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/query");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept"), Some("application/json"));

    let sent: Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent, json!({ "content": query }));
}

#[tokio::test]
async fn test_engine_error_is_not_transport_error() {
    let body = json!({
        "ok": false,
        "results": [{ "ok": false, "error": { "code": "LOCKED", "message": "table locked" } }],
        "stats": { "time_ms": 1 }
    });
    let (url, _handle) = serve(vec![Reply::json(body.to_string())]).await;

    let outcome = client(&url)
        .execute(&QueryRequest::new("DROP TABLE users"))
        .await
        .unwrap();
    assert!(!outcome.ok);
    let error = outcome.first().and_then(|r| r.error.as_ref()).unwrap();
    assert_eq!(error.message, "table locked");
}

#[tokio::test]
async fn test_list_tables_is_idempotent() {
    let (url, handle) = serve(vec![Reply::json(CATALOG), Reply::json(CATALOG)]).await;
    let service = client(&url);

    let first = service.list_tables().await;
    let second = service.list_tables().await;
    assert!(first.is_ok());
    assert_eq!(first, second);
    assert_eq!(handle.await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let (url, handle) = serve(vec![Reply::json("{}")]).await;

    let catalog = client(&format!("{url}/")).list_tables().await.unwrap();
    assert!(catalog.is_empty());
    assert_eq!(handle.await.unwrap()[0].path, "/tables");
}
