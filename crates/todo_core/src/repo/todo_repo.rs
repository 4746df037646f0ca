//! Todo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-record CRUD APIs over the `todos` table.
//! - Provide the destructive wipe primitive used by fixture seeding.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate requests before SQL mutations.
//! - Every insert/update stamps `updated_at` itself; column defaults are
//!   never relied on.
//! - Read-modify-write paths run inside one immediate transaction.
//! - Read paths reject only rows that cannot be decoded (`is_completed` not
//!   0/1, unparsable timestamps). Request rules are never applied on read.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::timestamp::{
    format_timestamp, parse_timestamp, stamp_insert, stamp_update, Clock, SystemClock,
};
use crate::model::todo::{NewTodo, Todo, TodoId, TodoPatch, TodoValidationError};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

const TODOS_TABLE: &str = "todos";

const TODO_COLUMNS: [&str; 5] = ["id", "text", "is_completed", "created_at", "updated_at"];

const TODO_SELECT_SQL: &str = "SELECT
    id,
    text,
    is_completed,
    created_at,
    updated_at
FROM todos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    /// Storage/transport failure (the connection error kind).
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for todo CRUD operations.
pub trait TodoRepository {
    /// Inserts one todo; the engine assigns `id`, both timestamps are stamped.
    fn create_todo(&self, request: &NewTodo) -> RepoResult<Todo>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    /// Full snapshot ordered by `created_at DESC, id DESC`.
    fn list_todos(&self) -> RepoResult<Vec<Todo>>;
    /// Applies `patch` and refreshes `updated_at`. Fails with `NotFound`.
    fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Todo>;
    /// Flips `is_completed` and refreshes `updated_at`. Fails with `NotFound`.
    fn toggle_todo(&self, id: TodoId) -> RepoResult<Todo>;
    /// Physically removes the row. Returns `false` when nothing matched.
    fn delete_todo(&self, id: TodoId) -> RepoResult<bool>;
    /// Removes every row and resets the id counter. Destructive.
    fn wipe_all(&self) -> RepoResult<()>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
    clock: Arc<dyn Clock>,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_todo_connection_ready(conn)?;
        Ok(Self {
            conn,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the stamping clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn mutate(&self, id: TodoId, make_patch: impl FnOnce(&Todo) -> TodoPatch) -> RepoResult<Todo> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut todo = load_todo(&tx, id)?.ok_or(RepoError::NotFound(id))?;

        let patch = make_patch(&todo);
        patch.validate()?;
        patch.apply_to(&mut todo);
        // Rows from other writers may carry updated_at < created_at.
        let previous = todo.created_at.max(todo.updated_at);
        todo.updated_at = stamp_update(self.clock.as_ref(), previous);

        tx.execute(
            "UPDATE todos
             SET
                text = ?1,
                is_completed = ?2,
                updated_at = ?3
             WHERE id = ?4;",
            params![
                todo.text.as_str(),
                bool_to_int(todo.is_completed),
                format_timestamp(todo.updated_at),
                id,
            ],
        )?;
        tx.commit()?;

        Ok(todo)
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, request: &NewTodo) -> RepoResult<Todo> {
        request.validate()?;

        let stamp = stamp_insert(self.clock.as_ref());
        let stamp_text = format_timestamp(stamp);
        self.conn.execute(
            "INSERT INTO todos (
                text,
                is_completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?3);",
            params![
                request.text.as_str(),
                bool_to_int(request.is_completed),
                stamp_text,
            ],
        )?;

        Ok(Todo {
            id: self.conn.last_insert_rowid(),
            text: request.text.clone(),
            is_completed: request.is_completed,
            created_at: stamp,
            updated_at: stamp,
        })
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        load_todo(self.conn, id)
    }

    fn list_todos(&self) -> RepoResult<Vec<Todo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} ORDER BY created_at DESC, id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn update_todo(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Todo> {
        patch.validate()?;
        self.mutate(id, |_| patch.clone())
    }

    fn toggle_todo(&self, id: TodoId) -> RepoResult<Todo> {
        self.mutate(id, TodoPatch::toggle)
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn wipe_all(&self) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM todos;", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = ?1;", [TODOS_TABLE])?;
        tx.commit()?;
        Ok(())
    }
}

fn load_todo(conn: &Connection, id: TodoId) -> RepoResult<Option<Todo>> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_todo_row(row)?));
    }

    Ok(None)
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in todos.is_completed"
            )));
        }
    };

    Ok(Todo {
        id: row.get("id")?,
        text: row.get("text")?,
        is_completed,
        created_at: parse_timestamp_column(row, "created_at")?,
        updated_at: parse_timestamp_column(row, "updated_at")?,
    })
}

fn parse_timestamp_column(row: &Row<'_>, column: &'static str) -> RepoResult<chrono::NaiveDateTime> {
    let text: String = row.get(column)?;
    parse_timestamp(&text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{text}` in todos.{column}"))
    })
}

fn ensure_todo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, TODOS_TABLE)? {
        return Err(RepoError::MissingRequiredTable(TODOS_TABLE));
    }

    for column in TODO_COLUMNS {
        if !table_has_column(conn, TODOS_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: TODOS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
