//! Task router.
//!
//! Dispatches descriptors to the handler registered for their task type.
//! Owns no state; an unknown task type yields a structured failure, never
//! an error past this boundary.

use std::collections::HashMap;

use crate::handler::TaskHandler;
use crate::types::{HandlerOutcome, TaskDescriptor, TaskType};

/// Registry of task handlers keyed by task type.
pub struct TaskRouter {
    handlers: HashMap<TaskType, Box<dyn TaskHandler>>,
}

impl TaskRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its own task type, replacing any previous
    /// registration for that type.
    pub fn register(&mut self, handler: Box<dyn TaskHandler>) {
        self.handlers.insert(handler.task_type(), handler);
    }

    /// Route a descriptor to its handler.
    pub async fn route(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        match self.handlers.get(&descriptor.task_type) {
            Some(handler) => {
                tracing::debug!(
                    user_id,
                    task_type = %descriptor.task_type,
                    action = %descriptor.action,
                    "Routing task"
                );
                handler.handle(descriptor, user_id).await
            }
            None => HandlerOutcome::Failed {
                task_type: "unknown",
                error: "unknown task type".to_string(),
            },
        }
    }
}

impl Default for TaskRouter {
    fn default() -> Self {
        Self::new()
    }
}
