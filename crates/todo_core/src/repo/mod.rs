//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract consumed by use-case services.
//! - Isolate SQLite query details from service/business orchestration.
//! - Provide an in-memory implementation with identical semantics.
//!
//! # Invariants
//! - Repository writes must enforce `TodoItem::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod feed;
pub mod memory_repo;
pub mod todo_repo;
