//! Core use-case services.
//!
//! # Responsibility
//! - Expose the UI-facing create/list/toggle/delete contract.
//! - Provide the async shared handle and the client-side write-through cache.
//! - Keep UI layers decoupled from storage details.

pub mod shared_store;
pub mod todo_cache;
pub mod todo_service;
