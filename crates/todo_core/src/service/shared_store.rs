//! Async, cloneable handle over one SQLite connection.
//!
//! # Responsibility
//! - Own the process's storage connection once it is opened at startup.
//! - Expose the UI-facing CRUD contract as `async fn`s.
//!
//! # Invariants
//! - Each operation holds the connection lock for exactly one operation;
//!   there is no cross-record transaction.
//! - Blocking SQLite work runs on the tokio blocking pool, never on the
//!   caller's executor thread.
//! - Writes acknowledged through a handle are visible to later reads through
//!   any clone of it.

use crate::db::DbError;
use crate::model::timestamp::{Clock, SystemClock};
use crate::model::todo::{Todo, TodoId, TodoPatch};
use crate::repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository};
use crate::seed::{seed_fixtures, SeededTodo};
use crate::service::todo_service::TodoService;
use rusqlite::Connection;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex};

/// Shared todo store. Clones share the same connection.
#[derive(Clone)]
pub struct SharedTodoStore {
    conn: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl Debug for SharedTodoStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTodoStore").finish_non_exhaustive()
    }
}

impl SharedTodoStore {
    /// Wraps a migrated connection. Rejects connections that are not ready.
    pub fn new(conn: Connection) -> RepoResult<Self> {
        SqliteTodoRepository::try_new(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the stamping clock for every later operation.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn create(&self, text: impl Into<String>) -> RepoResult<Todo> {
        let text = text.into();
        self.run(move |service| service.create(text)).await
    }

    pub async fn list(&self) -> RepoResult<Vec<Todo>> {
        self.run(|service| service.list()).await
    }

    pub async fn toggle(&self, id: TodoId) -> RepoResult<Todo> {
        self.run(move |service| service.toggle(id)).await
    }

    pub async fn delete(&self, id: TodoId) -> RepoResult<bool> {
        self.run(move |service| service.delete(id)).await
    }

    pub async fn get(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        self.run(move |service| service.get(id)).await
    }

    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> RepoResult<Todo> {
        self.run(move |service| service.update(id, &patch)).await
    }

    /// Wipes the table and loads the fixture set.
    pub async fn seed(&self) -> RepoResult<Vec<SeededTodo>> {
        self.run(|service| seed_fixtures(service.repository())).await
    }

    async fn run<T, F>(&self, op: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&TodoService<SqliteTodoRepository<'c>>) -> RepoResult<T>
            + Send
            + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let clock = Arc::clone(&self.clock);

        tokio::task::spawn_blocking(move || -> RepoResult<T> {
            let guard = conn
                .lock()
                .map_err(|err| DbError::Unavailable(format!("connection lock poisoned: {err}")))?;
            let repo = SqliteTodoRepository::try_new(&guard)?.with_clock(clock);
            let service = TodoService::new(repo);
            op(&service)
        })
        .await
        .map_err(|err| RepoError::Db(DbError::Unavailable(format!("blocking task failed: {err}"))))?
    }
}
