//! View-model for the create/edit form.
//!
//! # Responsibility
//! - Hold form fields and per-field error text.
//! - Validate on every edit and again before saving.
//! - Create or update through `TodoService` and report the outcome.

use crate::model::todo::{validate_description, validate_title, TodoId, TodoValidationError};
use crate::presentation::state::TodoEditUiState;
use crate::repo::todo_repo::TodoRepository;
use crate::service::todo_service::{TodoService, TodoServiceError};

pub struct TodoEditViewModel<'svc, R: TodoRepository> {
    service: &'svc TodoService<R>,
    state: TodoEditUiState,
}

impl<'svc, R: TodoRepository> TodoEditViewModel<'svc, R> {
    /// Starts in create mode with an empty form.
    pub fn new(service: &'svc TodoService<R>) -> Self {
        Self {
            service,
            state: TodoEditUiState::create_mode(),
        }
    }

    pub fn state(&self) -> &TodoEditUiState {
        &self.state
    }

    /// Loads an existing todo and switches the form to edit mode.
    pub fn load_todo(&mut self, id: TodoId) {
        self.state.is_loading = true;
        self.state.error_message = None;

        match self.service.get_todo(id) {
            Ok(Some(todo)) => self.state = TodoEditUiState::edit_mode(todo),
            Ok(None) => {
                self.state.is_loading = false;
                self.state.error_message = Some("Todo not found".to_string());
            }
            Err(err) => {
                self.state.is_loading = false;
                self.state.error_message = Some(format!("Failed to load todo: {err}"));
            }
        }
    }

    pub fn update_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.state.title_error = title_error(&title);
        self.state.title = title;
    }

    pub fn update_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.state.description_error = description_error(&description);
        self.state.description = description;
    }

    /// Creates or updates the todo from the current form.
    ///
    /// On success `is_saved` is set and the form keeps editing the saved
    /// item, so a second save updates rather than duplicates.
    pub fn save_todo(&mut self) {
        let title_error = title_error(&self.state.title);
        let description_error = description_error(&self.state.description);
        if title_error.is_some() || description_error.is_some() {
            self.state.title_error = title_error;
            self.state.description_error = description_error;
            return;
        }

        self.state.is_saving = true;
        self.state.error_message = None;

        let result = match &self.state.todo {
            Some(todo) => {
                self.service
                    .update_todo(todo.id, &self.state.title, &self.state.description)
            }
            None => self
                .service
                .create_todo(&self.state.title, &self.state.description),
        };

        self.state.is_saving = false;
        match result {
            Ok(saved) => {
                // Saved content is trimmed; keep the form in step with it.
                self.state.title = saved.title.clone();
                self.state.description = saved.description.clone();
                self.state.todo = Some(saved);
                self.state.is_saved = true;
                self.state.error_message = None;
            }
            Err(TodoServiceError::Validation(err)) => self.apply_validation_error(err),
            Err(err) => self.state.error_message = Some(err.to_string()),
        }
    }

    /// Clears the saved flag once the host navigated away.
    pub fn reset_saved_state(&mut self) {
        self.state.is_saved = false;
    }

    pub fn clear_error(&mut self) {
        self.state.error_message = None;
    }

    pub fn clear_field_errors(&mut self) {
        self.state.title_error = None;
        self.state.description_error = None;
    }

    fn apply_validation_error(&mut self, err: TodoValidationError) {
        match err.field() {
            "title" => self.state.title_error = Some(err.reason()),
            "description" => self.state.description_error = Some(err.reason()),
            _ => self.state.error_message = Some(err.to_string()),
        }
    }
}

fn title_error(title: &str) -> Option<String> {
    match validate_title(title) {
        Ok(()) => None,
        Err(TodoValidationError::BlankTitle) => Some("Title is required".to_string()),
        Err(err) => Some(err.reason()),
    }
}

fn description_error(description: &str) -> Option<String> {
    validate_description(description).err().map(|err| err.reason())
}
