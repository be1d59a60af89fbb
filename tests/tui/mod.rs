//! Integration tests for the terminal front-end.

mod common;
pub mod headless_test;
