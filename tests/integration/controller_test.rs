//! End-to-end tests for the execution controller.

use super::server::{serve, Reply};
use pretty_assertions::assert_eq;
use querydeck::api::{
    HttpQueryService, MockCall, MockQueryService, QueryOutcome, QueryService, TableCatalog,
    TransportError,
};
use querydeck::app::{QueryController, QueryState};
use querydeck::config::{Locale, ServerConfig};
use querydeck::schema::IndexKind;
use serde_json::{json, Value};
use std::sync::Arc;

fn outcome(value: Value) -> QueryOutcome {
    serde_json::from_value(value).unwrap()
}

fn catalog(value: Value) -> TableCatalog {
    serde_json::from_value(value).unwrap()
}

fn users_catalog() -> TableCatalog {
    catalog(json!({
        "users": {
            "relation": {
                "id": { "type": "int", "key": "primary" },
                "name": { "type": "varchar", "length": 32 }
            },
            "indexes": { "primary": { "index": "bplus" } }
        }
    }))
}

#[tokio::test]
async fn test_select_succeeds_with_rows_and_catalog() {
    let mock = Arc::new(MockQueryService::new());
    mock.push_query_response(Ok(outcome(json!({
        "ok": true,
        "results": [{
            "ok": true,
            "data": [{ "id": 1, "name": "ana" }, { "id": 2, "name": "luis" }],
            "meta": { "time_ms": 3 }
        }],
        "stats": { "time_ms": 4 }
    }))));
    mock.push_tables_response(Ok(users_catalog()));

    let mut controller = QueryController::new(mock.clone(), Locale::En);
    controller.execute("SELECT * FROM users").await;

    let QueryState::Succeeded(success) = controller.state() else {
        panic!("expected success, got {:?}", controller.state());
    };
    assert_eq!(success.message, "Executed: 3 ms");
    assert_eq!(success.grid.headers(), ["id", "name"]);
    assert_eq!(success.grid.row_count(), 2);
    assert_eq!(controller.tables()[0].name, "users");
    assert_eq!(
        mock.calls(),
        vec![
            MockCall::Execute("SELECT * FROM users".to_string()),
            MockCall::ListTables
        ]
    );
}

#[tokio::test]
async fn test_engine_error_clears_catalog_and_diagnostics() {
    let mock = Arc::new(MockQueryService::with_catalog(users_catalog()));
    let mut controller = QueryController::new(mock.clone(), Locale::En);
    controller.mount().await;
    assert_eq!(controller.tables().len(), 1);

    mock.push_query_response(Ok(outcome(json!({
        "ok": false,
        "results": [{
            "ok": false,
            "error": { "code": "LOCKED", "message": "table locked" },
            "meta": { "time_ms": 0.5 }
        }],
        "stats": { "time_ms": 1 }
    }))));
    controller.execute("DROP TABLE users").await;

    let QueryState::Failed { message } = controller.state() else {
        panic!("expected failure, got {:?}", controller.state());
    };
    assert!(message.contains("Executed: 1 ms"), "{message}");
    assert!(message.contains("table locked"), "{message}");
    assert!(controller.catalog().is_empty());
    assert!(controller.tables().is_empty());
}

#[tokio::test]
async fn test_mount_with_server_error_shows_generic_message() {
    let mock = Arc::new(MockQueryService::new());
    mock.push_tables_response(Err(TransportError::Status(500)));

    let mut controller = QueryController::new(mock, Locale::Es);
    controller.mount().await;

    assert_eq!(
        controller.state(),
        &QueryState::Failed {
            message: Locale::Es.generic_failure().to_string()
        }
    );
    assert!(controller.tables().is_empty());
}

#[tokio::test]
async fn test_primary_index_fallback_and_io_spellings() {
    let mock = Arc::new(MockQueryService::new());
    mock.push_query_response(Ok(outcome(json!({
        "ok": true,
        "results": [{
            "ok": true,
            "data": [],
            "meta": {
                "time_ms": 2,
                "io": {
                    "heap": { "read_count": 4, "write_count": 1 },
                    "index": { "readCount": 2, "writeCount": 3 },
                    "log": {}
                }
            },
            "plan": { "action": "select", "table": "users", "columns": ["id"], "where": null }
        }],
        "stats": { "time_ms": 2 }
    }))));
    mock.push_tables_response(Ok(users_catalog()));

    let mut controller = QueryController::new(mock, Locale::En);
    controller.execute("SELECT id FROM users").await;

    let id = &controller.tables()[0].columns[0];
    assert!(id.primary_key);
    assert_eq!(id.index, Some(IndexKind::Bplus));
    assert_eq!(controller.tables()[0].columns[1].index, None);

    let QueryState::Succeeded(success) = controller.state() else {
        panic!("expected success");
    };
    let io = success.diagnostics.io.as_ref().unwrap();
    assert_eq!((io.total_reads, io.total_writes), (6, 4));
    assert_eq!(io.lines[2].reads, 0);

    let plan = success.diagnostics.plan.as_ref().unwrap();
    assert_eq!(
        plan.fields,
        vec![
            ("action".to_string(), "select".to_string()),
            ("table".to_string(), "users".to_string()),
            ("columns".to_string(), "id".to_string()),
            ("where".to_string(), "null".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_whitespace_query_is_submitted_as_is() {
    let mock = Arc::new(MockQueryService::demo());
    let mut controller = QueryController::new(mock.clone(), Locale::En);
    controller.execute("   ").await;

    assert_eq!(mock.calls()[0], MockCall::Execute("   ".to_string()));
    assert_eq!(controller.state().label(), "failed");
}

#[tokio::test]
async fn test_http_execution_orders_query_before_tables() {
    let (url, handle) = serve(vec![
        Reply::json(
            json!({
                "ok": true,
                "results": [{ "ok": true, "data": [], "meta": { "time_ms": 1 } }],
                "stats": { "time_ms": 1 }
            })
            .to_string(),
        ),
        Reply::json(users_catalog_json()),
    ])
    .await;

    let service: Arc<dyn QueryService> =
        Arc::new(HttpQueryService::new(&ServerConfig::new(&url)).unwrap());
    let mut controller = QueryController::new(service, Locale::En);
    controller.execute("CREATE TABLE users (id int primary key)").await;

    assert_eq!(controller.state().message(), Some("Executed: 1 ms"));
    assert_eq!(controller.tables().len(), 1);

    let paths: Vec<String> = handle
        .await
        .unwrap()
        .into_iter()
        .map(|request| request.path)
        .collect();
    assert_eq!(paths, vec!["/query", "/tables"]);
}

#[tokio::test]
async fn test_unreachable_service_fails_generically() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service: Arc<dyn QueryService> = Arc::new(
        HttpQueryService::new(&ServerConfig::new(format!("http://{addr}"))).unwrap(),
    );
    let mut controller = QueryController::new(service, Locale::En);
    controller.execute("SELECT 1").await;

    assert_eq!(
        controller.state().message(),
        Some(Locale::En.generic_failure())
    );
}

fn users_catalog_json() -> String {
    serde_json::to_string(&users_catalog()).unwrap()
}
