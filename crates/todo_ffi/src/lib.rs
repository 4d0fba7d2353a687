//! Flutter-facing bindings for the todo core.
//!
//! All exported functions live in [`api`] and follow its FFI contract.

pub mod api;
