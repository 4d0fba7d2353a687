//! Todo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD, list and count APIs over `todo_items` storage.
//! - Publish list snapshots to observers after every successful write.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `TodoItem::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Lists are ordered by `created_at DESC, id DESC`.
//! - A write that succeeds but cannot be re-read for observers still returns
//!   `Ok`; observers are told through `TodoSubscription::take_error`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::todo::{TodoId, TodoItem, TodoValidationError};
use crate::repo::feed::{TodoFeed, TodoSubscription};
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    is_completed,
    created_at,
    completed_at,
    updated_at
FROM todo_items";

const TODO_TABLE: &str = "todo_items";
const TODO_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "is_completed",
    "created_at",
    "completed_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "Todo item with ID {id} not found"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing todos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    /// `Some(flag)` keeps only items whose completion flag equals `flag`.
    pub completed: Option<bool>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl TodoListQuery {
    /// Unpaged query over every item.
    pub fn all() -> Self {
        Self::default()
    }

    /// Unpaged query filtered by completion flag.
    pub fn by_completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

/// Aggregate counts over all stored todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoCounts {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Repository interface for todo storage.
pub trait TodoRepository {
    /// Persists a new item and returns it with its storage-generated ID.
    ///
    /// Any ID already set on `todo` is ignored.
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoItem>;
    /// Replaces every mutable field of an existing item.
    fn update_todo(&self, todo: &TodoItem) -> RepoResult<TodoItem>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>>;
    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<TodoItem>>;
    /// Hard-deletes an item; missing IDs yield `RepoError::NotFound`.
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    fn count_todos(&self) -> RepoResult<TodoCounts>;
    /// Subscribes to list snapshots, seeded with the current state.
    fn observe_todos(&self, completed: Option<bool>) -> RepoResult<TodoSubscription>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
    feed: TodoFeed,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Wraps a connection after checking it was bootstrapped by `db::open_db`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn)?;
        Ok(Self {
            conn,
            feed: TodoFeed::new(),
        })
    }

    fn publish_snapshot(&self, operation: &'static str) {
        if !self.feed.has_subscribers() {
            return;
        }
        match self.list_todos(&TodoListQuery::all()) {
            Ok(snapshot) => {
                self.feed.publish(&snapshot);
                debug!(
                    "event=todo_feed_publish module=repo status=ok op={} subscribers={} items={}",
                    operation,
                    self.feed.subscriber_count(),
                    snapshot.len()
                );
            }
            Err(err) => {
                warn!(
                    "event=todo_feed_publish module=repo status=error op={} error={}",
                    operation, err
                );
                self.feed
                    .publish_error(&format!("Failed to refresh todos after {operation}: {err}"));
            }
        }
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoItem> {
        todo.validate()?;

        self.conn.execute(
            "INSERT INTO todo_items (
                title,
                description,
                is_completed,
                created_at,
                completed_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                todo.title.as_str(),
                todo.description.as_str(),
                bool_to_int(todo.is_completed),
                todo.created_at,
                todo.completed_at,
                todo.updated_at,
            ],
        )?;

        let created = TodoItem {
            id: TodoId(self.conn.last_insert_rowid()),
            ..todo.clone()
        };
        self.publish_snapshot("create");
        Ok(created)
    }

    fn update_todo(&self, todo: &TodoItem) -> RepoResult<TodoItem> {
        todo.validate()?;

        let changed = self.conn.execute(
            "UPDATE todo_items
             SET
                title = ?1,
                description = ?2,
                is_completed = ?3,
                created_at = ?4,
                completed_at = ?5,
                updated_at = ?6
             WHERE id = ?7;",
            params![
                todo.title.as_str(),
                todo.description.as_str(),
                bool_to_int(todo.is_completed),
                todo.created_at,
                todo.completed_at,
                todo.updated_at,
                todo.id.0,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }

        self.publish_snapshot("update");
        Ok(todo.clone())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.0])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }

    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<TodoItem>> {
        let mut sql = format!("{TODO_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(completed) = query.completed {
            sql.push_str(" AND is_completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todo_items WHERE id = ?1;", [id.0])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.publish_snapshot("delete");
        Ok(())
    }

    fn count_todos(&self) -> RepoResult<TodoCounts> {
        let (total, completed): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_completed), 0) FROM todo_items;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let total = count_to_u64(total)?;
        let completed = count_to_u64(completed)?;
        Ok(TodoCounts {
            total,
            completed,
            pending: total.saturating_sub(completed),
        })
    }

    fn observe_todos(&self, completed: Option<bool>) -> RepoResult<TodoSubscription> {
        let snapshot = self.list_todos(&TodoListQuery::all())?;
        Ok(self.feed.subscribe(completed, &snapshot))
    }
}

fn ensure_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version > expected_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: actual_version,
            latest_supported: expected_version,
        }
        .into());
    }
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [TODO_TABLE],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(TODO_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({TODO_TABLE});"))?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in TODO_COLUMNS {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: TODO_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<TodoItem> {
    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in todo_items.is_completed"
            )));
        }
    };

    let todo = TodoItem {
        id: TodoId(row.get("id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        is_completed,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
        updated_at: row.get("updated_at")?,
    };
    todo.validate()?;
    Ok(todo)
}

fn count_to_u64(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative aggregate count `{value}`")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
