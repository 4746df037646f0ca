//! Fixture reset/seed routine.
//!
//! # Responsibility
//! - Wipe the `todos` table and reload a fixed, ordered fixture set.
//! - Report each inserted fixture with its assigned id.
//!
//! # Invariants
//! - Running the routine repeatedly always leaves exactly the fixture set,
//!   with ids starting at 1.
//! - Fixtures are inserted in declaration order.

use crate::model::todo::{NewTodo, TodoId};
use crate::repo::todo_repo::{RepoResult, TodoRepository};
use log::{error, info};
use std::time::Instant;

/// One fixture entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixture {
    pub text: &'static str,
    pub is_completed: bool,
}

pub const FIXTURE_TODOS: [Fixture; 3] = [
    Fixture {
        text: "Buy milk",
        is_completed: false,
    },
    Fixture {
        text: "Walk the dog",
        is_completed: false,
    },
    Fixture {
        text: "Learn React Router",
        is_completed: true,
    },
];

/// Confirmation for one inserted fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededTodo {
    pub id: TodoId,
    pub text: String,
}

/// Wipes every todo and inserts [`FIXTURE_TODOS`] in order.
///
/// # Side effects
/// - Destroys all existing rows and resets the id counter.
/// - Emits `seed` logging events.
pub fn seed_fixtures<R: TodoRepository + ?Sized>(repo: &R) -> RepoResult<Vec<SeededTodo>> {
    let started_at = Instant::now();
    info!("event=seed module=seed status=start fixtures={}", FIXTURE_TODOS.len());

    let result = reset_and_insert(repo);
    match &result {
        Ok(seeded) => info!(
            "event=seed module=seed status=ok inserted={} duration_ms={}",
            seeded.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=seed module=seed status=error duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn reset_and_insert<R: TodoRepository + ?Sized>(repo: &R) -> RepoResult<Vec<SeededTodo>> {
    repo.wipe_all()?;

    let mut seeded = Vec::with_capacity(FIXTURE_TODOS.len());
    for fixture in FIXTURE_TODOS {
        let todo = repo.create_todo(&NewTodo::new(fixture.text).completed(fixture.is_completed))?;
        info!("event=seed_insert module=seed status=ok id={}", todo.id);
        seeded.push(SeededTodo {
            id: todo.id,
            text: todo.text,
        });
    }

    Ok(seeded)
}
