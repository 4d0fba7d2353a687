//! View-model for the todo list screen.
//!
//! # Responsibility
//! - Keep `TodoListUiState` in sync with the live todo feed.
//! - Run delete/toggle/refresh intents through `TodoService`.
//! - Drive the delete confirmation dialog.
//!
//! # Invariants
//! - State only changes inside `&mut self` calls; the host polls
//!   `sync_updates` from its UI loop to pick up writes made elsewhere.

use crate::model::todo::{TodoId, TodoItem};
use crate::presentation::state::{TodoFilter, TodoListUiState};
use crate::repo::feed::TodoSubscription;
use crate::repo::todo_repo::TodoRepository;
use crate::service::todo_service::TodoService;
use log::debug;

pub struct TodoListViewModel<'svc, R: TodoRepository> {
    service: &'svc TodoService<R>,
    subscription: Option<TodoSubscription>,
    state: TodoListUiState,
}

impl<'svc, R: TodoRepository> TodoListViewModel<'svc, R> {
    /// Subscribes to all todos and applies the initial snapshot.
    pub fn new(service: &'svc TodoService<R>) -> Self {
        let mut view_model = Self {
            service,
            subscription: None,
            state: TodoListUiState::loading(),
        };
        view_model.subscribe();
        view_model.sync_updates();
        view_model
    }

    pub fn state(&self) -> &TodoListUiState {
        &self.state
    }

    /// Applies the newest pending snapshot and any refresh failure.
    ///
    /// Returns whether the visible state changed.
    pub fn sync_updates(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_ref() else {
            return false;
        };
        let failure = subscription.take_error();
        let snapshot = subscription.latest();
        let changed = failure.is_some() || snapshot.is_some();

        if let Some(snapshot) = snapshot {
            debug!(
                "event=todo_list_sync module=presentation status=ok items={}",
                snapshot.len()
            );
            self.state.todos = snapshot;
            self.state.is_loading = false;
            self.state.error_message = None;
            self.reload_counts();
        }
        if let Some(message) = failure {
            self.state.is_loading = false;
            self.state.error_message = Some(message);
        }
        changed
    }

    /// Re-reads the list directly instead of waiting for the feed.
    pub fn refresh(&mut self) {
        self.state.is_refreshing = true;
        let result = match self.state.filter.completed() {
            Some(completed) => self.service.get_todos_by_completion(completed),
            None => self.service.get_todos(),
        };
        match result {
            Ok(todos) => {
                self.state.todos = todos;
                self.state.error_message = None;
                self.reload_counts();
            }
            Err(err) => {
                self.state.error_message = Some(format!("Failed to refresh todos: {err}"));
            }
        }
        self.state.is_refreshing = false;
    }

    /// Switches the visible subset and resubscribes with the new filter.
    pub fn set_filter(&mut self, filter: TodoFilter) {
        if self.state.filter == filter && self.subscription.is_some() {
            return;
        }
        self.state.filter = filter;
        self.state.is_loading = true;
        self.subscribe();
        self.sync_updates();
    }

    pub fn delete_todo(&mut self, id: TodoId) {
        match self.service.delete_todo(id) {
            Ok(()) => {
                self.clear_error();
                self.sync_updates();
            }
            Err(err) => self.state.error_message = Some(err.to_string()),
        }
    }

    pub fn toggle_completion(&mut self, id: TodoId) {
        match self.service.toggle_todo_completion(id) {
            Ok(_) => {
                self.clear_error();
                self.sync_updates();
            }
            Err(err) => self.state.error_message = Some(err.to_string()),
        }
    }

    pub fn show_delete_confirmation(&mut self, todo: TodoItem) {
        self.state.pending_delete = Some(todo);
    }

    pub fn hide_delete_confirmation(&mut self) {
        self.state.pending_delete = None;
    }

    /// Deletes the item shown in the confirmation dialog and closes it.
    pub fn confirm_delete(&mut self) {
        if let Some(todo) = self.state.pending_delete.take() {
            self.delete_todo(todo.id);
        }
    }

    pub fn clear_error(&mut self) {
        self.state.error_message = None;
    }

    fn subscribe(&mut self) {
        // Dropping the old handle lets the feed prune it on next publish.
        self.subscription = None;
        match self.service.observe_todos(self.state.filter.completed()) {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(err) => {
                self.state.is_loading = false;
                self.state.error_message = Some(format!("Failed to load todos: {err}"));
            }
        }
    }

    fn reload_counts(&mut self) {
        match self.service.todo_counts() {
            Ok(counts) => self.state.counts = counts,
            Err(err) => self.state.error_message = Some(err.to_string()),
        }
    }
}
