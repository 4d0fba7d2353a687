//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level todo functions to Dart via FRB.
//! - Keep error semantics simple: every call returns an envelope with
//!   `ok` + human-readable `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection; no connection outlives a call.
//! - The DB path is resolved once per process and then fixed.

use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use todo_core::db::open_db;
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    SqliteTodoRepository, TodoId, TodoItem, TodoService, TodoServiceError,
};

const DB_FILE_NAME: &str = "todo_entry.sqlite3";
const DB_PATH_ENV: &str = "TODO_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file used by every later todo call.
///
/// # FFI contract
/// - Must run before the first todo call to take effect.
/// - Repeating the same path is accepted; a different path is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already resolved to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Todo projection handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: i64,
    pub completed_at: Option<i64>,
    pub updated_at: i64,
}

impl From<TodoItem> for TodoView {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id.0,
            title: item.title,
            description: item.description,
            is_completed: item.is_completed,
            created_at: item.created_at,
            completed_at: item.completed_at,
            updated_at: item.updated_at,
        }
    }
}

/// Response envelope for single-item todo calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Affected item, when the operation returns one.
    pub todo: Option<TodoView>,
    /// Field name when validation rejected the input.
    pub error_field: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, todo: Option<TodoView>) -> Self {
        Self {
            ok: true,
            todo,
            error_field: None,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: CallError) -> Self {
        let error_field = match &err {
            CallError::Service(service_err) => service_err.field().map(str::to_string),
            CallError::Setup(_) => None,
        };
        Self {
            ok: false,
            todo: None,
            error_field,
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Response envelope for list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub items: Vec<TodoView>,
    pub message: String,
}

/// Response envelope for count calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoCountsResponse {
    pub ok: bool,
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub message: String,
}

/// Lists todos newest first, optionally filtered by completion.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures return `ok = false` with empty `items`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_list(completed: Option<bool>) -> TodoListResponse {
    let result = with_todo_service(|service| match completed {
        Some(flag) => service.get_todos_by_completion(flag),
        None => service.get_todos(),
    });
    match result {
        Ok(items) => {
            let message = if items.is_empty() {
                "No todos.".to_string()
            } else {
                format!("Found {} todo(s).", items.len())
            };
            TodoListResponse {
                ok: true,
                items: items.into_iter().map(TodoView::from).collect(),
                message,
            }
        }
        Err(err) => TodoListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("todo_list failed: {err}"),
        },
    }
}

/// Gets one todo by ID; a missing ID is reported as `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_get(id: i64) -> TodoActionResponse {
    let todo_id = TodoId(id);
    match with_todo_service(|service| service.get_todo(todo_id)) {
        Ok(Some(todo)) => TodoActionResponse::success("Todo loaded.", Some(todo.into())),
        Ok(None) => TodoActionResponse::failure(
            "todo_get",
            CallError::Service(TodoServiceError::NotFound(todo_id)),
        ),
        Err(err) => TodoActionResponse::failure("todo_get", err),
    }
}

/// Creates a todo; title/description are validated then trimmed.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_create(title: String, description: String) -> TodoActionResponse {
    match with_todo_service(|service| service.create_todo(&title, &description)) {
        Ok(todo) => TodoActionResponse::success("Todo created.", Some(todo.into())),
        Err(err) => TodoActionResponse::failure("todo_create", err),
    }
}

/// Replaces title and description of an existing todo.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_update(id: i64, title: String, description: String) -> TodoActionResponse {
    match with_todo_service(|service| service.update_todo(TodoId(id), &title, &description)) {
        Ok(todo) => TodoActionResponse::success("Todo updated.", Some(todo.into())),
        Err(err) => TodoActionResponse::failure("todo_update", err),
    }
}

/// Flips completion of an existing todo.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_toggle(id: i64) -> TodoActionResponse {
    match with_todo_service(|service| service.toggle_todo_completion(TodoId(id))) {
        Ok(todo) => {
            let message = if todo.is_completed {
                "Todo completed."
            } else {
                "Todo reopened."
            };
            TodoActionResponse::success(message, Some(todo.into()))
        }
        Err(err) => TodoActionResponse::failure("todo_toggle", err),
    }
}

/// Hard-deletes a todo.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_delete(id: i64) -> TodoActionResponse {
    match with_todo_service(|service| service.delete_todo(TodoId(id))) {
        Ok(()) => TodoActionResponse::success("Todo deleted.", None),
        Err(err) => TodoActionResponse::failure("todo_delete", err),
    }
}

/// Returns total/completed/pending counts.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_counts() -> TodoCountsResponse {
    match with_todo_service(|service| service.todo_counts()) {
        Ok(counts) => TodoCountsResponse {
            ok: true,
            total: counts.total,
            completed: counts.completed,
            pending: counts.pending,
            message: format!("{} pending of {}.", counts.pending, counts.total),
        },
        Err(err) => TodoCountsResponse {
            ok: false,
            total: 0,
            completed: 0,
            pending: 0,
            message: format!("todo_counts failed: {err}"),
        },
    }
}

#[derive(Debug)]
enum CallError {
    Setup(String),
    Service(TodoServiceError),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => write!(f, "{message}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn open_connection() -> Result<Connection, CallError> {
    let db_path = resolve_db_path();
    open_db(&db_path).map_err(|err| {
        warn!("event=ffi_db_open module=ffi status=error error={err}");
        CallError::Setup(format!("todo DB open failed: {err}"))
    })
}

fn with_todo_service<T>(
    f: impl FnOnce(&TodoService<SqliteTodoRepository<'_>>) -> Result<T, TodoServiceError>,
) -> Result<T, CallError> {
    let conn = open_connection()?;
    let repo = SqliteTodoRepository::try_new(&conn)
        .map_err(|err| CallError::Setup(format!("todo repo init failed: {err}")))?;
    let service = TodoService::new(repo);
    f(&service).map_err(CallError::Service)
}

#[cfg(test)]
mod tests {
    use super::{
        configure_db_path, core_version, init_logging, ping, todo_counts, todo_create,
        todo_delete, todo_get, todo_list, todo_toggle, todo_update,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_db_path_rejects_blank_path() {
        assert!(!configure_db_path("  ".to_string()).is_empty());
    }

    #[test]
    fn create_then_get_and_list() {
        let title = unique_token("ffi-create");
        let created = todo_create(format!("  {title}  "), "notes".to_string());
        assert!(created.ok, "{}", created.message);
        let todo = created.todo.expect("created todo should be returned");
        assert_eq!(todo.title, title);
        assert!(todo.id > 0);

        let loaded = todo_get(todo.id);
        assert!(loaded.ok, "{}", loaded.message);
        assert_eq!(loaded.todo, Some(todo.clone()));

        let listed = todo_list(Some(false));
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|item| item.id == todo.id));
    }

    #[test]
    fn create_rejects_blank_title_with_field() {
        let response = todo_create("   ".to_string(), String::new());
        assert!(!response.ok);
        assert_eq!(response.error_field.as_deref(), Some("title"));
        assert!(response.message.starts_with("todo_create failed"));
    }

    #[test]
    fn toggle_update_delete_lifecycle() {
        let created = todo_create(unique_token("ffi-lifecycle"), String::new());
        let id = created.todo.expect("created todo").id;

        let toggled = todo_toggle(id);
        assert!(toggled.ok, "{}", toggled.message);
        let toggled_todo = toggled.todo.expect("toggled todo");
        assert!(toggled_todo.is_completed);
        assert!(toggled_todo.completed_at.is_some());

        let updated = todo_update(id, "renamed".to_string(), "desc".to_string());
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.todo.expect("updated todo").title, "renamed");

        let counts = todo_counts();
        assert!(counts.ok, "{}", counts.message);
        assert!(counts.completed >= 1);
        assert_eq!(counts.total, counts.completed + counts.pending);

        let deleted = todo_delete(id);
        assert!(deleted.ok, "{}", deleted.message);

        let again = todo_delete(id);
        assert!(!again.ok);
        assert!(again.message.contains("not found"));
        assert!(!todo_get(id).ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
