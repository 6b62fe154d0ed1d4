//! Conversation layer for Attache.
//!
//! Receives raw user text, routes it through the classifier and task
//! router, stages drafts with the confirmation engine, formats results into
//! display strings, and feeds interactions back into memory.

pub mod controller;
pub mod error;
pub mod response;

pub use controller::ConversationController;
pub use error::ChatError;
