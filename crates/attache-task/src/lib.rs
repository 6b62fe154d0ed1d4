//! Task-execution core for Attache.
//!
//! Classifies user messages into task descriptors, routes them to per-type
//! handlers, stages side-effecting actions as drafts behind a per-user
//! confirmation, and executes approved drafts exactly once.

pub mod auth;
pub mod classifier;
pub mod confirmation;
pub mod handler;
pub mod recurrence;
pub mod router;
pub mod trigger;
pub mod types;

pub use auth::AuthGate;
pub use classifier::{IntentClassifier, KeywordClassifier};
pub use confirmation::{ConfirmError, ConfirmationEngine, ReactionSignal, Resolution};
pub use recurrence::Recurrence;
pub use router::TaskRouter;
pub use trigger::{TriggerError, TriggerStore};
pub use types::{
    HandlerOutcome, TaskAction, TaskDescriptor, TaskType, Trigger, TriggerType,
};
