//! Domain model for todo items.
//!
//! # Responsibility
//! - Define the canonical record used by core business logic.
//! - Own field validation rules shared by service and repository layers.
//!
//! # Invariants
//! - Every persisted todo is identified by a storage-generated `TodoId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod todo;
