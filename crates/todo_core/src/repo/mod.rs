//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the CRUD contract over the `todos` table.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate requests before any SQL mutation.
//! - Repository writes stamp timestamps through `model::timestamp`.
//! - Repository APIs return semantic errors (`NotFound`, `Validation`) in
//!   addition to DB transport errors.

pub mod todo_repo;
