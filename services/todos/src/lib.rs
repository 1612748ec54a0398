pub mod api;
pub mod config;
pub mod event_log;
pub mod transport;
#[cfg(feature = "async-transport")]
pub mod transport_axum;

use schema::{CreateTodo, Todo, TodoId, TodoPatch, ValidationError, next_todo_id, position_of};
use store::{StoreError, TodoStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("todo ids exhausted")]
    IdsExhausted,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Full collection, or only the items whose `completed` flag equals the filter.
pub fn list_todos(store: &dyn TodoStore, completed: Option<bool>) -> Result<Vec<Todo>, TodoError> {
    let todos = store.load()?;
    Ok(match completed {
        Some(completed) => todos
            .into_iter()
            .filter(|todo| todo.completed == completed)
            .collect(),
        None => todos,
    })
}

pub fn get_todo(store: &dyn TodoStore, id: TodoId) -> Result<Todo, TodoError> {
    store
        .load()?
        .into_iter()
        .find(|todo| todo.id == id)
        .ok_or(TodoError::NotFound(id))
}

pub fn create_todo(store: &mut dyn TodoStore, input: CreateTodo) -> Result<Todo, TodoError> {
    let mut todos = store.load()?;
    let id = next_todo_id(&todos).ok_or(TodoError::IdsExhausted)?;
    let todo = Todo {
        id,
        title: input.title,
        completed: input.completed,
    };
    todos.push(todo.clone());
    store.save(&todos)?;
    Ok(todo)
}

pub fn update_todo(
    store: &mut dyn TodoStore,
    id: TodoId,
    patch: TodoPatch,
) -> Result<Todo, TodoError> {
    let mut todos = store.load()?;
    let index = position_of(&todos, id).ok_or(TodoError::NotFound(id))?;
    patch.apply_to(&mut todos[index]);
    let updated = todos[index].clone();
    store.save(&todos)?;
    Ok(updated)
}

pub fn delete_todo(store: &mut dyn TodoStore, id: TodoId) -> Result<Todo, TodoError> {
    let mut todos = store.load()?;
    let index = position_of(&todos, id).ok_or(TodoError::NotFound(id))?;
    let removed = todos.remove(index);
    store.save(&todos)?;
    Ok(removed)
}
