//! Memory store for Attache.
//!
//! Durable per-user mapping of preferences, writing style, important topics,
//! a bounded conversational history, and the single pending confirmation
//! slot, behind the `MemoryStore` trait.

pub mod extract;
pub mod store;

pub use store::{InMemoryStore, MemoryError, MemoryStore};
