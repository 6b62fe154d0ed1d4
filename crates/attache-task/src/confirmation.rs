//! Draft/confirmation engine.
//!
//! The per-user state machine NONE -> PENDING -> {EXECUTED, CANCELLED}.
//! Staging overwrites any unresolved draft (the at-most-one-pending
//! invariant is enforced by last-write-wins, not refusal). An approval
//! executes the stored draft exactly once and clears the pending record
//! only after the backend commit; a rejection clears immediately and never
//! touches a backend.

use std::sync::Arc;

use attache_backends::{CalendarBackend, MailBackend};
use attache_core::{Draft, PendingConfirmation};
use attache_memory::{MemoryError, MemoryStore};

/// Errors from staging a draft.
#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// A user's reaction to a pending draft, classified by a fixed mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionSignal {
    Approve,
    Reject,
    Unrecognized,
}

const APPROVE_GLYPHS: &[&str] = &["👍", "❤️", "😊", "🎉", "✅", "👌"];
const REJECT_GLYPHS: &[&str] = &["👎", "😡", "❌", "🤮"];

const APPROVE_WORDS: &[&str] = &[
    "yes", "yep", "yeah", "sure", "ok", "okay", "send it", "do it", "go ahead", "looks good",
];
const REJECT_WORDS: &[&str] = &["no", "nope", "cancel", "don't", "stop", "reject"];

impl ReactionSignal {
    /// Classify a reaction (emoji or free text) into a signal.
    ///
    /// Only exact matches count: a longer sentence that merely contains
    /// "yes" is not an approval.
    pub fn classify(input: &str) -> Self {
        let trimmed = input.trim();
        if APPROVE_GLYPHS.contains(&trimmed) {
            return ReactionSignal::Approve;
        }
        if REJECT_GLYPHS.contains(&trimmed) {
            return ReactionSignal::Reject;
        }

        let lowered = trimmed.to_lowercase();
        let lowered = lowered.trim_end_matches(['.', '!']);
        if APPROVE_WORDS.contains(&lowered) {
            ReactionSignal::Approve
        } else if REJECT_WORDS.contains(&lowered) {
            ReactionSignal::Reject
        } else {
            ReactionSignal::Unrecognized
        }
    }
}

/// Outcome of resolving a user's reaction against their pending draft.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The draft was approved and executed; the pending record is cleared.
    Executed {
        task_type: &'static str,
        details: String,
        external_id: Option<String>,
    },
    /// The draft was approved but the backend call failed; the pending
    /// record is retained so the user can retry.
    ExecutionFailed { error: String },
    /// The draft was rejected and discarded without any backend call.
    Cancelled,
    /// The reaction was not understood; state is unchanged.
    Clarification,
    /// There was no pending draft to act on.
    NothingPending,
}

/// The confirmation engine. Holds no state of its own beyond the current
/// request's working copy; the pending record lives in the memory store.
pub struct ConfirmationEngine {
    memory: Arc<dyn MemoryStore>,
    mail: Arc<dyn MailBackend>,
    calendar: Arc<dyn CalendarBackend>,
}

impl ConfirmationEngine {
    pub fn new(
        memory: Arc<dyn MemoryStore>,
        mail: Arc<dyn MailBackend>,
        calendar: Arc<dyn CalendarBackend>,
    ) -> Self {
        Self {
            memory,
            mail,
            calendar,
        }
    }

    /// Stage a draft as the user's pending confirmation.
    ///
    /// An unresolved earlier draft is silently superseded.
    pub fn stage(&self, user_id: &str, draft: Draft) -> Result<Draft, ConfirmError> {
        self.memory
            .set_pending(user_id, PendingConfirmation::new(draft.clone()))?;
        tracing::info!(user_id, draft_type = draft.kind_label(), "Draft staged");
        Ok(draft)
    }

    /// The user's current pending draft, if any.
    pub fn pending(&self, user_id: &str) -> Result<Option<PendingConfirmation>, ConfirmError> {
        Ok(self.memory.get_pending(user_id)?)
    }

    /// Resolve a reaction against the user's latest unresolved draft.
    pub async fn resolve(&self, user_id: &str, reaction: &str) -> Resolution {
        let pending = match self.memory.get_pending(user_id) {
            Ok(p) => p,
            Err(e) => return Resolution::ExecutionFailed {
                error: e.to_string(),
            },
        };
        let Some(pending) = pending else {
            return Resolution::NothingPending;
        };

        match ReactionSignal::classify(reaction) {
            ReactionSignal::Unrecognized => Resolution::Clarification,
            ReactionSignal::Reject => {
                if let Err(e) = self.memory.clear_pending(user_id) {
                    return Resolution::ExecutionFailed {
                        error: e.to_string(),
                    };
                }
                tracing::info!(user_id, "Draft rejected and discarded");
                Resolution::Cancelled
            }
            ReactionSignal::Approve => self.execute(user_id, &pending.draft).await,
        }
    }

    /// Execute an approved draft against the matching backend.
    ///
    /// The pending record is cleared only after a successful execution, so a
    /// crash between the two is recoverable by re-query; the backend's own
    /// external id prevents duplicate delivery on retry.
    async fn execute(&self, user_id: &str, draft: &Draft) -> Resolution {
        let (task_type, details, result) = match draft {
            Draft::Email(email) => (
                "email_sent",
                format!("Email sent to {}", email.to),
                self.mail.send(user_id, email).await,
            ),
            Draft::Calendar(event) => (
                "calendar_created",
                format!("Event '{}' created", event.title),
                self.calendar.create_event(user_id, event).await,
            ),
        };

        match result {
            Ok(receipt) if receipt.success => {
                if let Err(e) = self.memory.clear_pending(user_id) {
                    // The side effect committed; the stale pending record is
                    // the recoverable half of the failure.
                    tracing::error!(user_id, error = %e, "Failed to clear pending after execution");
                }
                tracing::info!(user_id, task_type, "Approved draft executed");
                Resolution::Executed {
                    task_type,
                    details,
                    external_id: receipt.external_id,
                }
            }
            Ok(receipt) => Resolution::ExecutionFailed {
                error: receipt
                    .error
                    .unwrap_or_else(|| "Backend reported failure".to_string()),
            },
            Err(e) => Resolution::ExecutionFailed {
                error: e.to_string(),
            },
        }
    }
}
