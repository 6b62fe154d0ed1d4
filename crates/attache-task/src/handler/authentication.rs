//! Authentication task handler.
//!
//! Turns explicit authentication requests into a challenge carrying a
//! single-use handle and a user-facing instruction string.

use std::sync::Arc;

use async_trait::async_trait;

use attache_backends::Service;

use crate::auth::AuthGate;
use crate::handler::TaskHandler;
use crate::types::{HandlerOutcome, TaskAction, TaskDescriptor, TaskType};

pub struct AuthenticationHandler {
    gate: Arc<AuthGate>,
}

impl AuthenticationHandler {
    pub fn new(gate: Arc<AuthGate>) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl TaskHandler for AuthenticationHandler {
    fn task_type(&self) -> TaskType {
        TaskType::Authentication
    }

    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        match descriptor.action {
            TaskAction::Authenticate | TaskAction::Connect => {
                let requested = descriptor.param("service");
                match Service::from_request(requested) {
                    Some(service) => self.gate.challenge(user_id, service),
                    None => HandlerOutcome::Failed {
                        task_type: "authentication",
                        error: format!("Authentication not supported for service: {}", requested),
                    },
                }
            }
            other => HandlerOutcome::Failed {
                task_type: "authentication",
                error: format!("Unknown authentication action: {}", other),
            },
        }
    }
}
