//! Capability backends for Attache.
//!
//! Defines the backend interface consumed by the task-execution core and
//! provides mock mail/calendar/document/issue implementations backed by
//! explicit keyed stores, plus the credential store and single-use
//! authentication handle issuer.

pub mod backend;
pub mod calendar;
pub mod credentials;
pub mod documents;
pub mod issues;
pub mod mail;

pub use backend::{BackendError, CalendarBackend, CapabilityBackend, MailBackend};
pub use calendar::{parse_datetime, MockCalendar};
pub use credentials::{
    generate_token, AuthHandle, AuthHandleIssuer, CredentialStore, InMemoryCredentialStore,
    Service,
};
pub use documents::MockDocuments;
pub use issues::MockIssues;
pub use mail::MockMail;
