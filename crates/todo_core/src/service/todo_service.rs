//! Todo use-case service.
//!
//! # Responsibility
//! - Provide one entry point per todo use case (create, update, delete,
//!   toggle completion, get, list, observe, count).
//! - Validate raw user input before anything reaches storage.
//! - Fold repository failures into the three user-facing error kinds.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Log lines carry IDs and outcomes only, never titles or descriptions.

use crate::model::todo::{
    now_epoch_ms, validate_description, validate_title, TodoId, TodoItem, TodoValidationError,
};
use crate::repo::feed::TodoSubscription;
use crate::repo::todo_repo::{RepoError, TodoCounts, TodoListQuery, TodoRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Tagged failure returned by every todo use case.
#[derive(Debug)]
pub enum TodoServiceError {
    /// A field failed validation; see `TodoValidationError::field`.
    Validation(TodoValidationError),
    /// The target todo does not exist.
    NotFound(TodoId),
    /// Underlying storage failed while running `operation`.
    Storage {
        operation: &'static str,
        source: RepoError,
    },
}

impl TodoServiceError {
    /// Field name for validation failures, `None` otherwise.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.field()),
            _ => None,
        }
    }

    fn from_repo(operation: &'static str, err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Storage {
                operation,
                source: other,
            },
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "Todo item with ID {id} not found"),
            Self::Storage { operation, source } => {
                write!(f, "Database operation '{operation}' failed: {source}")
            }
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage { source, .. } => Some(source),
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Use-case facade over a repository implementation.
pub struct TodoService<R: TodoRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository and the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, now_epoch_ms)
    }

    /// Creates a service with a custom epoch-millisecond clock.
    pub fn with_clock(repo: R, clock: fn() -> i64) -> Self {
        Self { repo, clock }
    }

    /// Validates input and persists a new open todo.
    ///
    /// # Contract
    /// - Title must be non-blank and at most 100 characters.
    /// - Description must be at most 500 characters.
    /// - Stored fields are trimmed; returned item carries the generated ID.
    pub fn create_todo(&self, title: &str, description: &str) -> ServiceResult<TodoItem> {
        validate_input("create_todo", title, description)?;

        let todo = TodoItem::new(title, description, (self.clock)());
        let created = self
            .repo
            .create_todo(&todo)
            .map_err(|err| storage_failure("create_todo", err))?;
        info!(
            "event=todo_create module=service status=ok todo_id={}",
            created.id
        );
        Ok(created)
    }

    /// Validates input and replaces title/description of an existing todo.
    ///
    /// Completion state and `created_at` are preserved.
    pub fn update_todo(
        &self,
        id: TodoId,
        title: &str,
        description: &str,
    ) -> ServiceResult<TodoItem> {
        validate_input("update_todo", title, description)?;

        let current = self.require_todo("update_todo", id)?;
        let updated = current.with_content(title, description, (self.clock)());
        let saved = self
            .repo
            .update_todo(&updated)
            .map_err(|err| storage_failure("update_todo", err))?;
        info!("event=todo_update module=service status=ok todo_id={id}");
        Ok(saved)
    }

    /// Hard-deletes one todo; missing IDs yield `NotFound`.
    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        self.repo
            .delete_todo(id)
            .map_err(|err| storage_failure("delete_todo", err))?;
        info!("event=todo_delete module=service status=ok todo_id={id}");
        Ok(())
    }

    /// Flips the completion flag and sets or clears `completed_at`.
    pub fn toggle_todo_completion(&self, id: TodoId) -> ServiceResult<TodoItem> {
        let current = self.require_todo("toggle_todo_completion", id)?;
        let toggled = current.toggled((self.clock)());
        let saved = self
            .repo
            .update_todo(&toggled)
            .map_err(|err| storage_failure("toggle_todo_completion", err))?;
        info!(
            "event=todo_toggle module=service status=ok todo_id={} completed={}",
            id, saved.is_completed
        );
        Ok(saved)
    }

    /// Gets one todo by ID; `Ok(None)` when it does not exist.
    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Option<TodoItem>> {
        self.repo
            .get_todo(id)
            .map_err(|err| storage_failure("get_todo", err))
    }

    /// Lists every todo, newest first.
    pub fn get_todos(&self) -> ServiceResult<Vec<TodoItem>> {
        self.list_todos(&TodoListQuery::all())
    }

    /// Lists todos whose completion flag equals `completed`, newest first.
    pub fn get_todos_by_completion(&self, completed: bool) -> ServiceResult<Vec<TodoItem>> {
        self.list_todos(&TodoListQuery::by_completion(completed))
    }

    /// Lists todos using filter and pagination options.
    pub fn list_todos(&self, query: &TodoListQuery) -> ServiceResult<Vec<TodoItem>> {
        self.repo
            .list_todos(query)
            .map_err(|err| storage_failure("list_todos", err))
    }

    /// Subscribes to live list snapshots, optionally filtered by completion.
    pub fn observe_todos(&self, completed: Option<bool>) -> ServiceResult<TodoSubscription> {
        self.repo
            .observe_todos(completed)
            .map_err(|err| storage_failure("observe_todos", err))
    }

    /// Returns total/completed/pending counts.
    pub fn todo_counts(&self) -> ServiceResult<TodoCounts> {
        self.repo
            .count_todos()
            .map_err(|err| storage_failure("todo_counts", err))
    }

    fn require_todo(&self, operation: &'static str, id: TodoId) -> ServiceResult<TodoItem> {
        match self.repo.get_todo(id) {
            Ok(Some(todo)) => Ok(todo),
            Ok(None) => {
                warn!("event=todo_lookup module=service status=not_found op={operation} todo_id={id}");
                Err(TodoServiceError::NotFound(id))
            }
            Err(err) => Err(storage_failure(operation, err)),
        }
    }
}

fn validate_input(
    operation: &'static str,
    title: &str,
    description: &str,
) -> Result<(), TodoValidationError> {
    validate_title(title)
        .and_then(|()| validate_description(description))
        .map_err(|err| {
            warn!(
                "event=todo_validate module=service status=rejected op={} field={}",
                operation,
                err.field()
            );
            err
        })
}

fn storage_failure(operation: &'static str, err: RepoError) -> TodoServiceError {
    let mapped = TodoServiceError::from_repo(operation, err);
    if let TodoServiceError::Storage { source, .. } = &mapped {
        error!(
            "event=todo_storage module=service status=error op={} error={}",
            operation, source
        );
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::{TodoService, TodoServiceError};
    use crate::db::DbError;
    use crate::model::todo::{TodoId, TodoItem};
    use crate::repo::feed::TodoSubscription;
    use crate::repo::todo_repo::{RepoError, RepoResult, TodoCounts, TodoListQuery, TodoRepository};

    struct BrokenRepo;

    fn broken() -> RepoError {
        RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }

    impl TodoRepository for BrokenRepo {
        fn create_todo(&self, _todo: &TodoItem) -> RepoResult<TodoItem> {
            Err(broken())
        }
        fn update_todo(&self, _todo: &TodoItem) -> RepoResult<TodoItem> {
            Err(broken())
        }
        fn get_todo(&self, _id: TodoId) -> RepoResult<Option<TodoItem>> {
            Err(broken())
        }
        fn list_todos(&self, _query: &TodoListQuery) -> RepoResult<Vec<TodoItem>> {
            Err(broken())
        }
        fn delete_todo(&self, _id: TodoId) -> RepoResult<()> {
            Err(broken())
        }
        fn count_todos(&self) -> RepoResult<TodoCounts> {
            Err(broken())
        }
        fn observe_todos(&self, _completed: Option<bool>) -> RepoResult<TodoSubscription> {
            Err(broken())
        }
    }

    #[test]
    fn storage_failures_are_tagged_with_operation() {
        let service = TodoService::new(BrokenRepo);

        let err = service.create_todo("write docs", "").unwrap_err();
        match &err {
            TodoServiceError::Storage { operation, .. } => assert_eq!(*operation, "create_todo"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Database operation 'create_todo' failed"));

        let err = service.toggle_todo_completion(TodoId(1)).unwrap_err();
        assert!(matches!(
            err,
            TodoServiceError::Storage {
                operation: "toggle_todo_completion",
                ..
            }
        ));
    }

    #[test]
    fn validation_runs_before_storage_is_touched() {
        let service = TodoService::new(BrokenRepo);

        let err = service.create_todo("   ", "").unwrap_err();
        assert_eq!(err.field(), Some("title"));

        let err = service
            .update_todo(TodoId(1), "ok", &"d".repeat(501))
            .unwrap_err();
        assert_eq!(err.field(), Some("description"));
    }
}
