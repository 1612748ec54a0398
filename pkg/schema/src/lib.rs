use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Core domain types
// ---------------------------------------------------------------------------

pub type TodoId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
}

/// Input for a new todo. The id is always assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTodo {
    pub title: String,
    pub completed: bool,
}

/// Partial update: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
}

/// Builds a `CreateTodo` from raw request fields. Only presence of a non-empty
/// title is checked.
pub fn validate_create(
    title: Option<String>,
    completed: Option<bool>,
) -> Result<CreateTodo, ValidationError> {
    let title = match title {
        Some(title) if !title.is_empty() => title,
        _ => return Err(ValidationError::MissingField("title")),
    };
    Ok(CreateTodo {
        title,
        completed: completed.unwrap_or(false),
    })
}

// ---------------------------------------------------------------------------
// Collection helpers
// ---------------------------------------------------------------------------

/// Next id for a collection: one past the largest id in use, 1 when empty.
/// Ids of deleted items below the maximum are never handed out again.
/// `None` once the largest id is `TodoId::MAX`.
pub fn next_todo_id(todos: &[Todo]) -> Option<TodoId> {
    match todos.iter().map(|todo| todo.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    }
}

pub fn position_of(todos: &[Todo], id: TodoId) -> Option<usize> {
    todos.iter().position(|todo| todo.id == id)
}

pub fn todo_builder(id: TodoId, title: &str, completed: bool) -> Todo {
    Todo {
        id,
        title: title.to_string(),
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_starts_at_one_for_empty_collection() {
        assert_eq!(next_todo_id(&[]), Some(1));
    }

    #[test]
    fn next_id_uses_max_not_length() {
        let todos = vec![todo_builder(7, "a", false), todo_builder(2, "b", true)];
        assert_eq!(next_todo_id(&todos), Some(8));
    }

    #[test]
    fn next_id_is_exhausted_at_max() {
        let todos = vec![todo_builder(TodoId::MAX, "last", false)];
        assert_eq!(next_todo_id(&todos), None);
    }

    #[test]
    fn validate_create_defaults_completed_to_false() {
        let created = validate_create(Some("buy milk".into()), None).unwrap();
        assert_eq!(created.title, "buy milk");
        assert!(!created.completed);
    }

    #[test]
    fn validate_create_rejects_missing_or_empty_title() {
        assert_eq!(
            validate_create(None, Some(true)),
            Err(ValidationError::MissingField("title"))
        );
        assert_eq!(
            validate_create(Some(String::new()), None),
            Err(ValidationError::MissingField("title"))
        );
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut todo = todo_builder(1, "write docs", false);
        TodoPatch {
            title: None,
            completed: Some(true),
        }
        .apply_to(&mut todo);
        assert_eq!(todo, todo_builder(1, "write docs", true));

        TodoPatch {
            title: Some("write more docs".into()),
            completed: None,
        }
        .apply_to(&mut todo);
        assert_eq!(todo, todo_builder(1, "write more docs", true));
    }

    #[test]
    fn todo_serializes_with_wire_field_names() {
        let json = serde_json::to_string(&todo_builder(3, "ship", true)).unwrap();
        assert_eq!(json, r#"{"id":3,"title":"ship","completed":true}"#);
    }
}
