use std::collections::HashSet;

use crate::model::todo::{Priority, Todo, TodoId, TodoUpdate};

/// Error type for todo operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoError {
    #[error("todo text cannot be empty")]
    EmptyText,
    #[error("todo not found: {0}")]
    NotFound(TodoId),
}

// Every operation takes the collection by reference and returns a new one;
// the input is never touched, so callers can compare old and new values.

/// Append a new incomplete todo. Rejects empty or whitespace-only text.
pub fn add(
    todos: &[Todo],
    text: &str,
    priority: Priority,
    due_date: Option<String>,
) -> Result<Vec<Todo>, TodoError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TodoError::EmptyText);
    }
    let mut todo = Todo::new(next_id(todos), text, priority);
    todo.due_date = due_date.filter(|d| !d.trim().is_empty());

    let mut next = todos.to_vec();
    next.push(todo);
    Ok(next)
}

/// Flip `completed` on the matching todo. No-op if absent.
pub fn toggle(todos: &[Todo], id: TodoId) -> Vec<Todo> {
    todos
        .iter()
        .map(|t| {
            if t.id == id {
                Todo {
                    completed: !t.completed,
                    ..t.clone()
                }
            } else {
                t.clone()
            }
        })
        .collect()
}

/// Remove the matching todo. No-op if absent.
pub fn delete(todos: &[Todo], id: TodoId) -> Vec<Todo> {
    todos.iter().filter(|t| t.id != id).cloned().collect()
}

/// Merge `update` into the matching todo. Rejects an edit that would leave
/// the text empty. No-op if absent.
pub fn edit(todos: &[Todo], id: TodoId, update: &TodoUpdate) -> Result<Vec<Todo>, TodoError> {
    let mut next = todos.to_vec();
    let Some(todo) = next.iter_mut().find(|t| t.id == id) else {
        return Ok(next);
    };

    if let Some(text) = &update.text {
        let text = text.trim();
        if text.is_empty() {
            return Err(TodoError::EmptyText);
        }
        todo.text = text.to_string();
    }
    if let Some(priority) = update.priority {
        todo.priority = priority;
    }
    if let Some(due_date) = &update.due_date {
        todo.due_date = due_date.clone().filter(|d| !d.trim().is_empty());
    }
    Ok(next)
}

/// Look up a todo by id
pub fn find(todos: &[Todo], id: TodoId) -> Option<&Todo> {
    todos.iter().find(|t| t.id == id)
}

/// Next free id: the first integer above every id in the collection.
/// If that would overflow, the smallest positive integer not in use.
pub fn next_id(todos: &[Todo]) -> TodoId {
    let highest = todos
        .iter()
        .filter_map(|t| t.id.floor_u64())
        .max()
        .unwrap_or(0);
    if let Some(next) = highest.checked_add(1) {
        return TodoId::new(next);
    }

    let used: HashSet<u64> = todos.iter().filter_map(|t| t.id.as_u64()).collect();
    let mut candidate = 1;
    while used.contains(&candidate) {
        candidate += 1;
    }
    TodoId::new(candidate)
}
