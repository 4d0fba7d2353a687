//! Per-screen view-models and immutable UI state snapshots.
//!
//! # Responsibility
//! - Translate user intents into use-case calls.
//! - Publish plain state values a UI host renders without touching storage.
//!
//! # Invariants
//! - View-models never talk to a repository directly; only through
//!   `TodoService`.
//! - Errors reach the UI as dismissible text, never as panics.

pub mod edit_view_model;
pub mod list_view_model;
pub mod state;
