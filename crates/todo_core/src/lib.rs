//! Core domain logic for the local todo list.
//! This crate is the single source of truth for todo invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod presentation;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::todo::{
    now_epoch_ms, TodoId, TodoItem, TodoValidationError, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
pub use presentation::edit_view_model::TodoEditViewModel;
pub use presentation::list_view_model::TodoListViewModel;
pub use presentation::state::{TodoEditUiState, TodoFilter, TodoListUiState};
pub use repo::feed::TodoSubscription;
pub use repo::memory_repo::InMemoryTodoRepository;
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoCounts, TodoListQuery, TodoRepository,
};
pub use service::todo_service::{ServiceResult, TodoService, TodoServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
