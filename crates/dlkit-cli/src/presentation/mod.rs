//! Notification sinks for terminal output.
//!
//! # Guidelines
//!
//! - Keep this module format-only: no session logic
//! - Progress and diagnostics go to stderr; stdout carries results only

pub mod console;
pub mod json;

pub use console::ConsoleSink;
pub use json::JsonLinesSink;
