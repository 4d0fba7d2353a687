use todo_core::{TodoId, TodoItem, TodoValidationError, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

#[test]
fn new_trims_fields_and_starts_open() {
    let item = TodoItem::new("  buy milk  ", "\toat\n", 1_700_000_000_000);

    assert_eq!(item.id, TodoId::UNASSIGNED);
    assert!(!item.id.is_assigned());
    assert_eq!(item.title, "buy milk");
    assert_eq!(item.description, "oat");
    assert!(!item.is_completed);
    assert_eq!(item.completed_at, None);
    assert_eq!(item.created_at, item.updated_at);
    assert!(item.validate().is_ok());
}

#[test]
fn toggling_twice_restores_completion_state() {
    let item = TodoItem::new("water plants", "", 1_000);

    let done = item.toggled(2_000);
    assert!(done.is_completed);
    assert_eq!(done.completed_at, Some(2_000));
    assert_eq!(done.updated_at, 2_000);

    let reopened = done.toggled(3_000);
    assert!(!reopened.is_completed);
    assert_eq!(reopened.completed_at, None);
    assert_eq!(reopened.updated_at, 3_000);
    assert_eq!(reopened.created_at, item.created_at);
}

#[test]
fn with_content_keeps_completion_state() {
    let done = TodoItem::new("draft", "", 1_000).mark_completed(2_000);
    let edited = done.with_content(" final ", " notes ", 3_000);

    assert_eq!(edited.title, "final");
    assert_eq!(edited.description, "notes");
    assert!(edited.is_completed);
    assert_eq!(edited.completed_at, Some(2_000));
}

#[test]
fn validate_enforces_length_bounds() {
    let mut item = TodoItem::new("x", "", 1);

    item.title = "t".repeat(TITLE_MAX_CHARS + 1);
    assert_eq!(
        item.validate().unwrap_err(),
        TodoValidationError::TitleTooLong {
            chars: TITLE_MAX_CHARS + 1
        }
    );

    item.title = "t".repeat(TITLE_MAX_CHARS);
    item.description = "d".repeat(DESCRIPTION_MAX_CHARS + 1);
    let err = item.validate().unwrap_err();
    assert_eq!(err.field(), "description");
    assert_eq!(err.reason(), "Description cannot exceed 500 characters");
}

#[test]
fn validate_rejects_completion_mismatch() {
    let mut item = TodoItem::new("x", "", 1);
    item.is_completed = true;
    assert_eq!(
        item.validate().unwrap_err(),
        TodoValidationError::CompletionMismatch { is_completed: true }
    );

    let mut item = TodoItem::new("x", "", 1);
    item.completed_at = Some(5);
    assert_eq!(
        item.validate().unwrap_err(),
        TodoValidationError::CompletionMismatch {
            is_completed: false
        }
    );
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let item = TodoItem {
        id: TodoId(42),
        ..TodoItem::new("ship release", "tag and publish", 1_700_000_000_000)
    }
    .mark_completed(1_700_000_360_000);

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], 42);
    assert_eq!(json["title"], "ship release");
    assert_eq!(json["description"], "tag and publish");
    assert_eq!(json["is_completed"], true);
    assert_eq!(json["created_at"], 1_700_000_000_000_i64);
    assert_eq!(json["completed_at"], 1_700_000_360_000_i64);
    assert_eq!(json["updated_at"], 1_700_000_360_000_i64);

    let decoded: TodoItem = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, item);
}

#[test]
fn deserialize_defaults_updated_at_and_rejects_invalid_state() {
    let legacy = serde_json::json!({
        "id": 7,
        "title": "legacy row",
        "created_at": 1_000
    });
    let decoded: TodoItem = serde_json::from_value(legacy).unwrap();
    assert_eq!(decoded.updated_at, 1_000);
    assert_eq!(decoded.description, "");

    let invalid = serde_json::json!({
        "id": 8,
        "title": "   ",
        "created_at": 1_000
    });
    let err = serde_json::from_value::<TodoItem>(invalid).unwrap_err();
    assert!(err.to_string().contains("title"));
}
