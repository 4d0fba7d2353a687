use todo_core::db::open_db_in_memory;
use todo_core::{
    InMemoryTodoRepository, SqliteTodoRepository, TodoEditViewModel, TodoFilter, TodoId,
    TodoListViewModel, TodoService,
};

#[test]
fn list_view_model_loads_initial_snapshot() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    service.create_todo("existing", "").unwrap();

    let view_model = TodoListViewModel::new(&service);
    let state = view_model.state();
    assert!(!state.is_loading);
    assert_eq!(state.todos.len(), 1);
    assert_eq!(state.counts.total, 1);
    assert!(!state.is_empty());
}

#[test]
fn list_view_model_picks_up_writes_from_other_screens() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());
    let mut list = TodoListViewModel::new(&service);
    assert!(list.state().is_empty());

    let mut edit = TodoEditViewModel::new(&service);
    edit.update_title("from edit screen");
    edit.save_todo();
    assert!(edit.state().is_saved);

    assert!(list.sync_updates());
    assert_eq!(list.state().todos.len(), 1);
    assert_eq!(list.state().todos[0].title, "from edit screen");
    assert!(!list.sync_updates());
}

#[test]
fn list_view_model_toggle_and_filter() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let open = service.create_todo("open", "").unwrap();
    let done = service.create_todo("done", "").unwrap();

    let mut list = TodoListViewModel::new(&service);
    list.toggle_completion(done.id);
    assert_eq!(list.state().counts.completed, 1);
    assert!(list
        .state()
        .todos
        .iter()
        .any(|todo| todo.id == done.id && todo.is_completed));

    list.set_filter(TodoFilter::Active);
    assert_eq!(list.state().filter, TodoFilter::Active);
    assert_eq!(list.state().todos.len(), 1);
    assert_eq!(list.state().todos[0].id, open.id);

    list.toggle_completion(open.id);
    assert!(list.state().todos.is_empty());
    assert!(list.state().is_empty());

    list.set_filter(TodoFilter::Completed);
    assert_eq!(list.state().todos.len(), 2);
}

#[test]
fn list_view_model_delete_confirmation_flow() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let doomed = service.create_todo("doomed", "").unwrap();
    let mut list = TodoListViewModel::new(&service);

    list.show_delete_confirmation(doomed.clone());
    assert_eq!(list.state().pending_delete, Some(doomed.clone()));
    list.hide_delete_confirmation();
    assert_eq!(list.state().pending_delete, None);
    assert_eq!(list.state().todos.len(), 1);

    list.show_delete_confirmation(doomed);
    list.confirm_delete();
    assert_eq!(list.state().pending_delete, None);
    assert!(list.state().todos.is_empty());
    assert!(!list.state().has_error());
}

#[test]
fn list_view_model_surfaces_not_found_as_dismissible_message() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let mut list = TodoListViewModel::new(&service);

    list.delete_todo(TodoId(5));
    assert_eq!(
        list.state().error_message.as_deref(),
        Some("Todo item with ID 5 not found")
    );
    list.clear_error();
    assert!(!list.state().has_error());

    list.toggle_completion(TodoId(6));
    assert!(list.state().has_error());
}

#[test]
fn list_view_model_refresh_reads_current_rows() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let mut list = TodoListViewModel::new(&service);
    service.create_todo("added behind the feed", "").unwrap();

    list.refresh();
    assert!(!list.state().is_refreshing);
    assert_eq!(list.state().todos.len(), 1);
    assert_eq!(list.state().counts.pending, 1);
}

#[test]
fn list_view_model_reports_failed_refresh_after_write() {
    let conn = open_db_in_memory().unwrap();
    let service = TodoService::new(SqliteTodoRepository::try_new(&conn).unwrap());
    let mut list = TodoListViewModel::new(&service);
    assert!(!list.state().has_error());

    // updated_at before created_at passes the table CHECKs but not row validation.
    conn.execute(
        "INSERT INTO todo_items (title, description, is_completed, created_at, completed_at, updated_at)
         VALUES ('corrupt', '', 0, 2000, NULL, 1000)",
        [],
    )
    .unwrap();
    service.create_todo("still written", "").unwrap();

    assert!(list.sync_updates());
    let message = list.state().error_message.clone().unwrap();
    assert!(message.starts_with("Failed to refresh todos after create"));
    assert!(list.state().todos.is_empty());
    assert!(!list.sync_updates());
}

#[test]
fn edit_view_model_validates_each_keystroke() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let mut edit = TodoEditViewModel::new(&service);
    assert!(!edit.state().is_edit_mode());
    assert!(!edit.state().can_save());

    edit.update_title("   ");
    assert_eq!(edit.state().title_error.as_deref(), Some("Title is required"));

    edit.update_title("x".repeat(101));
    assert_eq!(
        edit.state().title_error.as_deref(),
        Some("Title cannot exceed 100 characters")
    );

    edit.update_title("groceries");
    edit.update_description("y".repeat(501));
    assert_eq!(edit.state().title_error, None);
    assert_eq!(
        edit.state().description_error.as_deref(),
        Some("Description cannot exceed 500 characters")
    );
    assert!(!edit.state().can_save());

    edit.clear_field_errors();
    assert!(!edit.state().has_validation_errors());
}

#[test]
fn edit_view_model_save_blocks_invalid_form() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let mut edit = TodoEditViewModel::new(&service);

    edit.save_todo();
    assert!(!edit.state().is_saved);
    assert_eq!(edit.state().title_error.as_deref(), Some("Title is required"));
    assert!(service.get_todos().unwrap().is_empty());
}

#[test]
fn edit_view_model_creates_then_updates_same_item() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let mut edit = TodoEditViewModel::new(&service);

    edit.update_title("write report");
    assert!(edit.state().is_modified());
    edit.save_todo();
    assert!(edit.state().is_saved);
    assert!(edit.state().is_edit_mode());
    edit.reset_saved_state();
    assert!(!edit.state().is_saved);

    edit.update_description("section 2");
    edit.save_todo();

    let todos = service.get_todos().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].description, "section 2");
}

#[test]
fn edit_view_model_form_matches_trimmed_item_after_save() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let mut edit = TodoEditViewModel::new(&service);

    edit.update_title("  buy milk  ");
    edit.update_description(" two litres ");
    edit.save_todo();

    let state = edit.state();
    assert!(state.is_saved);
    assert_eq!(state.title, "buy milk");
    assert_eq!(state.description, "two litres");
    assert!(!state.is_modified());
    assert_eq!(service.get_todos().unwrap()[0].title, "buy milk");
}

#[test]
fn edit_view_model_loads_existing_and_reports_missing() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let existing = service.create_todo("call mom", "sunday").unwrap();

    let mut edit = TodoEditViewModel::new(&service);
    edit.load_todo(existing.id);
    assert!(edit.state().is_edit_mode());
    assert!(!edit.state().is_loading);
    assert_eq!(edit.state().title, "call mom");
    assert_eq!(edit.state().description, "sunday");
    assert!(!edit.state().is_modified());

    let mut missing = TodoEditViewModel::new(&service);
    missing.load_todo(TodoId(999));
    assert!(!missing.state().is_edit_mode());
    assert_eq!(missing.state().error_message.as_deref(), Some("Todo not found"));
    missing.clear_error();
    assert_eq!(missing.state().error_message, None);
}

#[test]
fn edit_view_model_reports_item_deleted_while_editing() {
    let service = TodoService::new(InMemoryTodoRepository::new());
    let existing = service.create_todo("short lived", "").unwrap();

    let mut edit = TodoEditViewModel::new(&service);
    edit.load_todo(existing.id);
    service.delete_todo(existing.id).unwrap();

    edit.update_title("renamed");
    edit.save_todo();
    assert!(!edit.state().is_saved);
    assert!(!edit.state().is_saving);
    assert_eq!(
        edit.state().error_message,
        Some(format!("Todo item with ID {} not found", existing.id))
    );
}
