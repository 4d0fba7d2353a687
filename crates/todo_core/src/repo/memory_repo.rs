//! In-memory todo repository.
//!
//! Same contract as [`SqliteTodoRepository`](super::todo_repo::SqliteTodoRepository),
//! without persistence. Used by previews, demos and tests that do not need a
//! database file.

use crate::model::todo::{TodoId, TodoItem};
use crate::repo::feed::{TodoFeed, TodoSubscription};
use crate::repo::todo_repo::{RepoError, RepoResult, TodoCounts, TodoListQuery, TodoRepository};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    items: BTreeMap<TodoId, TodoItem>,
}

/// Todo repository backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    state: RefCell<MemoryState>,
    feed: TodoFeed,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Vec<TodoItem> {
        let state = self.state.borrow();
        let mut items: Vec<TodoItem> = state.items.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items
    }

    fn publish_snapshot(&self) {
        if self.feed.has_subscribers() {
            self.feed.publish(&self.snapshot());
        }
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoItem> {
        todo.validate()?;

        let created = {
            let mut state = self.state.borrow_mut();
            // IDs are never reused, matching AUTOINCREMENT.
            state.last_id += 1;
            let created = TodoItem {
                id: TodoId(state.last_id),
                ..todo.clone()
            };
            state.items.insert(created.id, created.clone());
            created
        };

        self.publish_snapshot();
        Ok(created)
    }

    fn update_todo(&self, todo: &TodoItem) -> RepoResult<TodoItem> {
        todo.validate()?;

        {
            let mut state = self.state.borrow_mut();
            let slot = state
                .items
                .get_mut(&todo.id)
                .ok_or(RepoError::NotFound(todo.id))?;
            *slot = todo.clone();
        }

        self.publish_snapshot();
        Ok(todo.clone())
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<TodoItem>> {
        Ok(self.state.borrow().items.get(&id).cloned())
    }

    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<TodoItem>> {
        let filtered = self
            .snapshot()
            .into_iter()
            .filter(|item| query.completed.map_or(true, |flag| item.is_completed == flag))
            .skip(query.offset as usize);

        Ok(match query.limit {
            Some(limit) => filtered.take(limit as usize).collect(),
            None => filtered.collect(),
        })
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let removed = self.state.borrow_mut().items.remove(&id);
        if removed.is_none() {
            return Err(RepoError::NotFound(id));
        }

        self.publish_snapshot();
        Ok(())
    }

    fn count_todos(&self) -> RepoResult<TodoCounts> {
        let state = self.state.borrow();
        let total = state.items.len() as u64;
        let completed = state.items.values().filter(|item| item.is_completed).count() as u64;
        Ok(TodoCounts {
            total,
            completed,
            pending: total - completed,
        })
    }

    fn observe_todos(&self, completed: Option<bool>) -> RepoResult<TodoSubscription> {
        Ok(self.feed.subscribe(completed, &self.snapshot()))
    }
}
