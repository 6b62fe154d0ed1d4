//! Capability backend trait definitions.
//!
//! A capability backend exposes one external domain (mail, calendar,
//! documents, issues) behind a narrow search/create surface. The core never
//! assumes anything about backend internals beyond these traits.

use async_trait::async_trait;

use attache_core::{ActionReceipt, BackendKind, CalendarDraft, EmailDraft, SearchItem};

/// Errors from capability backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid fields: {0}")]
    InvalidFields(String),
}

/// Common surface of every capability backend: identity and search.
///
/// A failing search must surface as an `Err`, never a panic; the fan-out
/// search isolates per-backend failures into empty contributions.
#[async_trait]
pub trait CapabilityBackend: Send + Sync {
    /// Which backend this is. Used to tag search results with their source.
    fn kind(&self) -> BackendKind;

    /// Search this backend for `query`, returning at most `limit` items.
    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchItem>, BackendError>;
}

/// Mail delivery on top of the common backend surface.
#[async_trait]
pub trait MailBackend: CapabilityBackend {
    /// Deliver an approved email draft. The returned receipt carries the
    /// backend-assigned message id.
    async fn send(&self, user_id: &str, draft: &EmailDraft)
        -> Result<ActionReceipt, BackendError>;
}

/// Calendar event management on top of the common backend surface.
#[async_trait]
pub trait CalendarBackend: CapabilityBackend {
    /// Create an event from an approved calendar draft. The returned receipt
    /// carries the backend-assigned event id.
    async fn create_event(
        &self,
        user_id: &str,
        draft: &CalendarDraft,
    ) -> Result<ActionReceipt, BackendError>;

    /// Delete an event by id. A missing event is reported in the receipt,
    /// not as an `Err`.
    async fn delete_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<ActionReceipt, BackendError>;

    /// Events starting within the next `days` days, soonest first.
    async fn upcoming_events(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<SearchItem>, BackendError>;
}
