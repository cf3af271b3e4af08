//! Telegram bot serving cat facts, jokes, random facts and name-based
//! predictions, with an in-memory favorites list.
//!
//! The binary in `main.rs` wires the dptree dispatch tree; this library
//! exposes the bot handlers, configuration, content providers and the
//! favorites storage seam.

/// Dispatch-facing bot logic: handlers, dialogue state, menus, middleware.
pub mod bot;
/// Configuration and settings management.
pub mod config;
/// Thin wrappers around the public content APIs.
pub mod content;
/// Favorites storage and last-content recording.
pub mod favorites;
