//! The `MemoryStore` trait and its in-memory keyed implementation.
//!
//! Every operation is an atomic read-modify-write keyed by `user_id`.
//! Conversational history is a bounded ring buffer with oldest-first
//! eviction; the pending-confirmation slot is last-write-wins.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use attache_core::{Interaction, PendingConfirmation, UserContext};

use crate::extract;

/// Errors from memory store operations.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Memory store unavailable: {0}")]
    Unavailable(String),
}

/// Durable per-user memory: context, history, and the pending confirmation.
///
/// At most one pending confirmation exists per user; `set_pending` replaces
/// any unresolved one (last-write-wins).
pub trait MemoryStore: Send + Sync {
    /// The user's accumulated context. New users get the empty default.
    fn get_context(&self, user_id: &str) -> Result<UserContext, MemoryError>;

    /// Record one conversational turn and fold it into the user's context.
    fn put_interaction(&self, user_id: &str, interaction: Interaction) -> Result<(), MemoryError>;

    /// The most recent interactions, oldest first, at most `limit`.
    fn recent_interactions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Interaction>, MemoryError>;

    fn get_pending(&self, user_id: &str) -> Result<Option<PendingConfirmation>, MemoryError>;

    fn set_pending(
        &self,
        user_id: &str,
        pending: PendingConfirmation,
    ) -> Result<(), MemoryError>;

    fn clear_pending(&self, user_id: &str) -> Result<(), MemoryError>;
}

#[derive(Default)]
struct UserRecord {
    context: UserContext,
    interactions: VecDeque<Interaction>,
    pending: Option<PendingConfirmation>,
}

/// In-memory keyed implementation of `MemoryStore`.
pub struct InMemoryStore {
    records: Mutex<HashMap<String, UserRecord>>,
    history_capacity: usize,
}

impl InMemoryStore {
    /// Create a store whose per-user history holds `history_capacity` turns.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            history_capacity,
        }
    }

    fn with_record<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut UserRecord) -> T,
    ) -> Result<T, MemoryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| MemoryError::Unavailable(format!("Lock poisoned: {}", e)))?;
        Ok(f(records.entry(user_id.to_string()).or_default()))
    }
}

impl MemoryStore for InMemoryStore {
    fn get_context(&self, user_id: &str) -> Result<UserContext, MemoryError> {
        self.with_record(user_id, |r| r.context.clone())
    }

    fn put_interaction(&self, user_id: &str, interaction: Interaction) -> Result<(), MemoryError> {
        let capacity = self.history_capacity;
        self.with_record(user_id, |r| {
            extract::extract_preferences(&interaction.user_message, &mut r.context.preferences);
            extract::extract_writing_style(
                &interaction.user_message,
                &mut r.context.writing_style,
            );
            extract::extract_topics(
                &interaction.user_message,
                &mut r.context.important_topics,
            );
            r.context.summary = extract::update_summary(
                &r.context.summary,
                &interaction.user_message,
                &interaction.response,
            );

            r.interactions.push_back(interaction);
            while r.interactions.len() > capacity {
                r.interactions.pop_front();
            }
        })
    }

    fn recent_interactions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Interaction>, MemoryError> {
        self.with_record(user_id, |r| {
            let skip = r.interactions.len().saturating_sub(limit);
            r.interactions.iter().skip(skip).cloned().collect()
        })
    }

    fn get_pending(&self, user_id: &str) -> Result<Option<PendingConfirmation>, MemoryError> {
        self.with_record(user_id, |r| r.pending.clone())
    }

    fn set_pending(
        &self,
        user_id: &str,
        pending: PendingConfirmation,
    ) -> Result<(), MemoryError> {
        self.with_record(user_id, |r| {
            if r.pending.is_some() {
                tracing::debug!(user_id, "Replacing unresolved pending confirmation");
            }
            r.pending = Some(pending);
        })
    }

    fn clear_pending(&self, user_id: &str) -> Result<(), MemoryError> {
        self.with_record(user_id, |r| {
            r.pending = None;
        })
    }
}
