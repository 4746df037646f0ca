//! Todo use-case service.
//!
//! # Responsibility
//! - Provide the UI-facing CRUD entry points (`create`, `list`, `toggle`,
//!   `delete`) plus `get`/`update` for other core callers.
//! - Emit one metadata-only log event per operation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or stamping.
//! - Service layer remains storage-agnostic.
//! - Item text is never logged.

use crate::model::todo::{NewTodo, Todo, TodoId, TodoPatch};
use crate::repo::todo_repo::{RepoError, RepoResult, TodoRepository};
use log::{debug, warn};

/// Use-case service wrapper for todo CRUD operations.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates an open todo.
    ///
    /// # Contract
    /// - Blank text fails with `RepoError::Validation`.
    /// - Returned record has `is_completed = false` and
    ///   `created_at == updated_at`.
    pub fn create(&self, text: impl Into<String>) -> RepoResult<Todo> {
        let request = NewTodo::new(text);
        let result = self.repo.create_todo(&request);
        log_outcome("todo_create", result.as_ref().map(|todo| todo.id).ok(), &result);
        result
    }

    /// Lists all todos, most recently created first.
    pub fn list(&self) -> RepoResult<Vec<Todo>> {
        let result = self.repo.list_todos();
        match &result {
            Ok(todos) => debug!(
                "event=todo_list module=service status=ok count={}",
                todos.len()
            ),
            Err(err) => warn!("event=todo_list module=service status=error error={err}"),
        }
        result
    }

    /// Flips the completion flag of an existing todo.
    ///
    /// # Contract
    /// - Missing `id` fails with `RepoError::NotFound`.
    /// - `updated_at` strictly increases; other fields are unchanged.
    pub fn toggle(&self, id: TodoId) -> RepoResult<Todo> {
        let result = self.repo.toggle_todo(id);
        log_outcome("todo_toggle", Some(id), &result);
        result
    }

    /// Deletes a todo. Deleting a missing id succeeds and returns `false`.
    pub fn delete(&self, id: TodoId) -> RepoResult<bool> {
        let result = self.repo.delete_todo(id);
        log_outcome("todo_delete", Some(id), &result);
        result
    }

    /// Gets one todo by id.
    pub fn get(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        self.repo.get_todo(id)
    }

    /// Applies a partial update. `updated_at` is refreshed even for an
    /// empty patch.
    pub fn update(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Todo> {
        let result = self.repo.update_todo(id, patch);
        log_outcome("todo_update", Some(id), &result);
        result
    }
}

fn log_outcome<T>(event: &str, id: Option<TodoId>, result: &RepoResult<T>) {
    let id = id.map_or_else(|| "none".to_string(), |id| id.to_string());
    match result {
        Ok(_) => debug!("event={event} module=service status=ok id={id}"),
        Err(RepoError::NotFound(_)) | Err(RepoError::Validation(_)) => {
            debug!("event={event} module=service status=rejected id={id}")
        }
        Err(err) => warn!("event={event} module=service status=error id={id} error={err}"),
    }
}
