//! Integration tests for headless mode.

use super::common::run_querydeck;
use serde_json::Value;

fn run_json(queries: &[&str]) -> (i32, Value) {
    let mut args = vec!["--headless", "--mock", "--output", "json"];
    for query in queries {
        args.push("--query");
        args.push(query);
    }
    let (code, stdout, stderr) = run_querydeck(&args);
    let json = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}\nstderr: {stderr}"));
    (code, json)
}

#[test]
fn test_headless_select_succeeds() {
    let (code, json) = run_json(&["SELECT * FROM users"]);

    assert_eq!(code, 0);
    assert_eq!(json["state"], "succeeded");
    assert_eq!(json["message"], "Executed: 1 ms");
    assert_eq!(json["grid"]["headers"][0], "id");
    assert_eq!(json["tables"][0], "users");
    assert_eq!(json["server"], "mock://demo");
}

#[test]
fn test_headless_engine_error_exits_nonzero() {
    let (code, json) = run_json(&["SELECT * FROM ghosts"]);

    assert_eq!(code, 1);
    assert_eq!(json["state"], "failed");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Table 'ghosts' does not exist"));
    assert_eq!(json["tables"].as_array().unwrap().len(), 0);
}

#[test]
fn test_headless_last_state_decides_exit_code() {
    let (code, json) = run_json(&["SELECT * FROM ghosts", "SELECT * FROM places"]);

    assert_eq!(code, 0);
    assert_eq!(json["state"], "succeeded");
    assert_eq!(json["queries"].as_array().unwrap().len(), 2);
}

#[test]
fn test_headless_text_output_renders_screen() {
    let (code, stdout, _) = run_querydeck(&[
        "--headless",
        "--mock",
        "--size",
        "120x30",
        "--query",
        "SELECT * FROM users",
    ]);

    assert_eq!(code, 0);
    assert!(stdout.starts_with("State: succeeded\nExecuted: 1 ms\n"));
    assert!(stdout.contains("QueryDeck"));
    assert!(stdout.contains("Tables (2)"));
    assert!(stdout.contains("ana@example.com"));
}

#[test]
fn test_headless_invalid_size() {
    let (code, _, stderr) = run_querydeck(&["--headless", "--mock", "--size", "huge"]);

    assert_eq!(code, 1);
    assert!(stderr.contains("Invalid size format"));
}
