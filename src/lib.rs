//! Council TUI - a terminal client for an LLM council backend
//!
//! This library exposes modules for use in integration tests.

pub mod api;
pub mod app;
pub mod config;
pub mod sse;
pub mod transcript;
pub mod ui;
