//! Common test utilities for TUI tests.

use std::process::Command;

/// Runs querydeck with the given arguments and returns (exit code, stdout, stderr).
pub fn run_querydeck(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_querydeck"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}
