//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record and its copy-on-write lifecycle helpers.
//! - Validate title/description bounds and completion timestamp consistency.
//!
//! # Invariants
//! - `title` is non-blank and at most `TITLE_MAX_CHARS` characters.
//! - `description` is at most `DESCRIPTION_MAX_CHARS` characters.
//! - `completed_at` is set if and only if `is_completed` is true.
//! - `updated_at` is never earlier than `created_at`.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Storage-generated identifier for a todo item.
///
/// `TodoId(0)` marks an item that has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl TodoId {
    /// Placeholder ID for items not yet assigned by storage.
    pub const UNASSIGNED: TodoId = TodoId(0);

    pub fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for todo fields and lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    BlankTitle,
    TitleTooLong { chars: usize },
    DescriptionTooLong { chars: usize },
    CompletionMismatch { is_completed: bool },
    TimestampOrder { created_at: i64, updated_at: i64 },
}

impl TodoValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTitle | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::CompletionMismatch { .. } => "completed_at",
            Self::TimestampOrder { .. } => "updated_at",
        }
    }

    /// Human-readable reason, suitable for direct display next to a field.
    pub fn reason(&self) -> String {
        match self {
            Self::BlankTitle => "Title cannot be empty or blank".to_string(),
            Self::TitleTooLong { .. } => {
                format!("Title cannot exceed {TITLE_MAX_CHARS} characters")
            }
            Self::DescriptionTooLong { .. } => {
                format!("Description cannot exceed {DESCRIPTION_MAX_CHARS} characters")
            }
            Self::CompletionMismatch { is_completed: true } => {
                "Completed todo must have a completion time".to_string()
            }
            Self::CompletionMismatch {
                is_completed: false,
            } => "Open todo cannot have a completion time".to_string(),
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => format!("updated_at ({updated_at}) is earlier than created_at ({created_at})"),
        }
    }
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation failed for field '{}': {}",
            self.field(),
            self.reason()
        )
    }
}

impl Error for TodoValidationError {}

/// Validates raw title input as typed by the user.
pub fn validate_title(title: &str) -> Result<(), TodoValidationError> {
    if title.trim().is_empty() {
        return Err(TodoValidationError::BlankTitle);
    }
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(TodoValidationError::TitleTooLong { chars });
    }
    Ok(())
}

/// Validates raw description input as typed by the user.
pub fn validate_description(description: &str) -> Result<(), TodoValidationError> {
    let chars = description.chars().count();
    if chars > DESCRIPTION_MAX_CHARS {
        return Err(TodoValidationError::DescriptionTooLong { chars });
    }
    Ok(())
}

/// Canonical todo record.
///
/// Lifecycle helpers return new copies instead of mutating in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Present only when `is_completed`.
    pub completed_at: Option<i64>,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

#[derive(Deserialize)]
struct TodoItemWire {
    id: TodoId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_completed: bool,
    created_at: i64,
    #[serde(default)]
    completed_at: Option<i64>,
    updated_at: Option<i64>,
}

impl<'de> Deserialize<'de> for TodoItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = TodoItemWire::deserialize(deserializer)?;
        let item = TodoItem {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            is_completed: wire.is_completed,
            created_at: wire.created_at,
            completed_at: wire.completed_at,
            updated_at: wire.updated_at.unwrap_or(wire.created_at),
        };
        item.validate().map_err(serde::de::Error::custom)?;
        Ok(item)
    }
}

impl TodoItem {
    /// Creates an unpersisted, open todo with trimmed fields.
    ///
    /// Does not validate; callers validate raw input first.
    pub fn new(title: &str, description: &str, now_ms: i64) -> Self {
        Self {
            id: TodoId::UNASSIGNED,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            is_completed: false,
            created_at: now_ms,
            completed_at: None,
            updated_at: now_ms,
        }
    }

    /// Returns a completed copy stamped with `now_ms`.
    pub fn mark_completed(&self, now_ms: i64) -> Self {
        Self {
            is_completed: true,
            completed_at: Some(now_ms),
            updated_at: self.touch(now_ms),
            ..self.clone()
        }
    }

    /// Returns an open copy with the completion time cleared.
    pub fn mark_uncompleted(&self, now_ms: i64) -> Self {
        Self {
            is_completed: false,
            completed_at: None,
            updated_at: self.touch(now_ms),
            ..self.clone()
        }
    }

    /// Returns a copy with the completion flag flipped.
    pub fn toggled(&self, now_ms: i64) -> Self {
        if self.is_completed {
            self.mark_uncompleted(now_ms)
        } else {
            self.mark_completed(now_ms)
        }
    }

    /// Returns a copy with replaced (trimmed) title and description.
    pub fn with_content(&self, title: &str, description: &str, now_ms: i64) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            updated_at: self.touch(now_ms),
            ..self.clone()
        }
    }

    /// Checks every record-level invariant.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        if self.is_completed != self.completed_at.is_some() {
            return Err(TodoValidationError::CompletionMismatch {
                is_completed: self.is_completed,
            });
        }
        if self.updated_at < self.created_at {
            return Err(TodoValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    // Clocks can step backwards; keep updated_at monotonic per item.
    fn touch(&self, now_ms: i64) -> i64 {
        now_ms.max(self.updated_at)
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{validate_title, TodoItem, TodoValidationError, TITLE_MAX_CHARS};

    #[test]
    fn title_counts_characters_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn whitespace_only_title_is_blank() {
        assert_eq!(
            validate_title(" \t\n").unwrap_err(),
            TodoValidationError::BlankTitle
        );
    }

    #[test]
    fn touch_never_moves_updated_at_backwards() {
        let item = TodoItem::new("a", "", 1_000);
        let completed = item.mark_completed(500);
        assert_eq!(completed.updated_at, 1_000);
        assert_eq!(completed.completed_at, Some(500));
        assert!(completed.validate().is_ok());
    }
}
