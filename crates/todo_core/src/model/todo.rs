//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record returned to UI callers.
//! - Define insert/update requests and their validation.
//!
//! # Invariants
//! - Records written through this crate have non-blank `text` and
//!   `created_at <= updated_at`.
//! - Decoded rows are returned as stored; other writers may break either
//!   rule, and the next update through this crate restores the ordering.
//! - Requests cannot carry `id`, `created_at` or `updated_at`; those are
//!   owned by the storage layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Engine-assigned row id. Never reused within a database lifetime, except
/// after an explicit wipe.
pub type TodoId = i64;

/// Canonical persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub is_completed: bool,
    /// Set once at insert.
    pub created_at: NaiveDateTime,
    /// Refreshed by every write.
    pub updated_at: NaiveDateTime,
}

impl Todo {
    /// Checks the invariants this crate maintains for records it writes.
    /// Not applied to rows read back from storage.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_text(&self.text)?;
        if self.created_at > self.updated_at {
            return Err(TodoValidationError::TimestampsOutOfOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Insert request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub is_completed: bool,
}

impl NewTodo {
    /// Creates an open (not completed) todo request.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_completed: false,
        }
    }

    /// Sets the initial completion flag. Fixture loading uses this; UI
    /// creates always start open.
    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_text(&self.text)
    }
}

/// Partial update request. `None` leaves the column unchanged.
///
/// An empty patch is still a write: it refreshes `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that flips the completion flag of `current`.
    pub fn toggle(current: &Todo) -> Self {
        Self {
            text: None,
            is_completed: Some(!current.is_completed),
        }
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        match self.text.as_deref() {
            Some(text) => validate_text(text),
            None => Ok(()),
        }
    }

    /// Applies patched fields to `todo`, leaving timestamps untouched.
    pub fn apply_to(&self, todo: &mut Todo) {
        if let Some(text) = &self.text {
            todo.text = text.clone();
        }
        if let Some(is_completed) = self.is_completed {
            todo.is_completed = is_completed;
        }
    }
}

/// Validation failure for todo records and requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// `text` is empty or whitespace only.
    BlankText,
    TimestampsOutOfOrder {
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "todo text must not be blank"),
            Self::TimestampsOutOfOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at {updated_at} is earlier than created_at {created_at}"
            ),
        }
    }
}

impl Error for TodoValidationError {}

fn validate_text(text: &str) -> Result<(), TodoValidationError> {
    if text.trim().is_empty() {
        return Err(TodoValidationError::BlankText);
    }
    Ok(())
}
