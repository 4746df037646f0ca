//! Client-held todo snapshot with write-through semantics.
//!
//! # Responsibility
//! - Hold the list a presentation layer renders.
//! - Apply toggle/delete optimistically, then reconcile with the stored
//!   record or roll back.
//!
//! # Invariants
//! - On any failed operation the snapshot equals its pre-operation state.
//! - Successful toggles replace the local record with the returned one.
//!   Ids absent from the snapshot are still toggled in the store, but the
//!   snapshot only reconciles records it already holds; call `refresh` to
//!   pick up rows created elsewhere.
//! - Creates are applied locally only after the store assigns an id.

use crate::model::todo::{Todo, TodoId};
use crate::repo::todo_repo::{RepoResult, TodoRepository};
use crate::service::todo_service::TodoService;
use log::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListCache {
    items: Vec<Todo>,
}

impl TodoListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a fresh snapshot from the store.
    pub fn load<R: TodoRepository>(service: &TodoService<R>) -> RepoResult<Self> {
        Ok(Self {
            items: service.list()?,
        })
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.items.iter().find(|todo| todo.id == id)
    }

    /// Replaces the snapshot with the stored list. Keeps the old snapshot on
    /// failure.
    pub fn refresh<R: TodoRepository>(&mut self, service: &TodoService<R>) -> RepoResult<()> {
        let todos = service.list().inspect_err(|err| {
            warn!("event=cache_refresh module=cache status=error error={err}");
        })?;
        self.items = todos;
        Ok(())
    }

    /// Creates a todo and prepends it. Blank input is skipped without a store
    /// call and yields `Ok(None)`.
    pub fn add<R: TodoRepository>(
        &mut self,
        service: &TodoService<R>,
        text: &str,
    ) -> RepoResult<Option<Todo>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let todo = service.create(text)?;
        self.items.insert(0, todo.clone());
        Ok(Some(todo))
    }

    /// Flips the local record, then reconciles with the stored one.
    ///
    /// An id missing from the snapshot leaves the snapshot unchanged.
    pub fn toggle<R: TodoRepository>(
        &mut self,
        service: &TodoService<R>,
        id: TodoId,
    ) -> RepoResult<Todo> {
        let snapshot = self.items.clone();
        if let Some(local) = self.items.iter_mut().find(|todo| todo.id == id) {
            local.is_completed = !local.is_completed;
        }

        match service.toggle(id) {
            Ok(stored) => {
                if let Some(local) = self.items.iter_mut().find(|todo| todo.id == id) {
                    *local = stored.clone();
                }
                Ok(stored)
            }
            Err(err) => {
                self.rollback("cache_toggle", id, snapshot);
                Err(err)
            }
        }
    }

    /// Removes the local record, then deletes it from the store.
    pub fn delete<R: TodoRepository>(
        &mut self,
        service: &TodoService<R>,
        id: TodoId,
    ) -> RepoResult<()> {
        let snapshot = self.items.clone();
        self.items.retain(|todo| todo.id != id);

        match service.delete(id) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.rollback("cache_delete", id, snapshot);
                Err(err)
            }
        }
    }

    fn rollback(&mut self, event: &str, id: TodoId, snapshot: Vec<Todo>) {
        warn!("event={event} module=cache status=rolled_back id={id}");
        self.items = snapshot;
    }
}
