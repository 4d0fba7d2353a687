//! Core use-case services.
//!
//! # Responsibility
//! - Validate user input, then orchestrate repository calls.
//! - Keep view-model/FFI layers decoupled from storage details.

pub mod todo_service;
