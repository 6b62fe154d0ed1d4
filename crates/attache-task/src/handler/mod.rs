//! Task handler trait and per-type handler implementations.
//!
//! Each handler owns the interpretation of its own actions and parameters;
//! an action it does not recognize yields a structured failure.

use async_trait::async_trait;

use crate::types::{HandlerOutcome, TaskDescriptor, TaskType};

pub mod authentication;
pub mod calendar;
pub mod email;
pub mod integration;
pub mod search;
pub mod trigger;

pub use authentication::AuthenticationHandler;
pub use calendar::CalendarHandler;
pub use email::EmailHandler;
pub use integration::IntegrationHandler;
pub use search::SearchHandler;
pub use trigger::TriggerHandler;

/// A handler for one task family.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// The task type this handler is registered under.
    fn task_type(&self) -> TaskType;

    /// Handle a descriptor of this handler's type for one user.
    ///
    /// Must never panic or leak an error; every failure becomes a
    /// `HandlerOutcome::Failed`.
    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome;
}
