//! Domain model for the todo core.
//!
//! # Responsibility
//! - Define the canonical todo record and its write requests.
//! - Own the timestamp stamping rule applied on every write.
//!
//! # Invariants
//! - Every todo is identified by an engine-assigned integer id.
//! - Deletion is physical; there are no tombstones.

pub mod timestamp;
pub mod todo;
