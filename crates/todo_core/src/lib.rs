//! Persistence core for the todo application.
//! This crate is the single source of truth for todo invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::timestamp::{Clock, FixedClock, SystemClock};
pub use model::todo::{NewTodo, Todo, TodoId, TodoPatch, TodoValidationError};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use seed::{seed_fixtures, Fixture, SeededTodo, FIXTURE_TODOS};
pub use service::shared_store::SharedTodoStore;
pub use service::todo_cache::TodoListCache;
pub use service::todo_service::TodoService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
