//! UI state snapshots for the list and edit screens.

use crate::model::todo::TodoItem;
use crate::repo::todo_repo::TodoCounts;

/// Which todos the list screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoFilter {
    #[default]
    All,
    /// Not yet completed.
    Active,
    Completed,
}

impl TodoFilter {
    /// Completion flag used for repository filtering.
    pub fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }
}

/// State of the todo list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListUiState {
    pub todos: Vec<TodoItem>,
    pub filter: TodoFilter,
    pub counts: TodoCounts,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error_message: Option<String>,
    /// Item awaiting delete confirmation, if the dialog is open.
    pub pending_delete: Option<TodoItem>,
}

impl TodoListUiState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    /// Empty-state UI applies only once loading finished.
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty() && !self.is_loading
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// State of the create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoEditUiState {
    /// Original item in edit mode; `None` in create mode.
    pub todo: Option<TodoItem>,
    pub title: String,
    pub description: String,
    pub title_error: Option<String>,
    pub description_error: Option<String>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub is_saved: bool,
    pub error_message: Option<String>,
}

impl TodoEditUiState {
    pub fn create_mode() -> Self {
        Self::default()
    }

    pub fn edit_mode(todo: TodoItem) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            todo: Some(todo),
            ..Self::default()
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.todo.is_some()
    }

    pub fn has_validation_errors(&self) -> bool {
        self.title_error.is_some() || self.description_error.is_some()
    }

    pub fn can_save(&self) -> bool {
        !self.title.trim().is_empty() && !self.has_validation_errors() && !self.is_saving
    }

    /// Whether the form differs from what it was opened with.
    pub fn is_modified(&self) -> bool {
        match &self.todo {
            None => !self.title.trim().is_empty() || !self.description.trim().is_empty(),
            Some(todo) => self.title != todo.title || self.description != todo.description,
        }
    }
}
