//! QueryDeck - an interactive client for a remote query service.
//!
//! This library exposes the core modules for use in integration tests.

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod results;
pub mod schema;
pub mod tui;
