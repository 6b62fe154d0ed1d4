//! Email task handler.
//!
//! Sending and composing stage a draft for confirmation; nothing is
//! delivered from this handler. Searching is read-only. All paths are
//! gated on a mail credential.

use std::sync::Arc;

use async_trait::async_trait;

use attache_backends::{MailBackend, Service};
use attache_core::{Draft, EmailDraft};

use crate::auth::AuthGate;
use crate::handler::TaskHandler;
use crate::types::{HandlerOutcome, TaskAction, TaskDescriptor, TaskType};

pub struct EmailHandler {
    gate: Arc<AuthGate>,
    mail: Arc<dyn MailBackend>,
    search_limit: usize,
}

impl EmailHandler {
    pub fn new(gate: Arc<AuthGate>, mail: Arc<dyn MailBackend>, search_limit: usize) -> Self {
        Self {
            gate,
            mail,
            search_limit,
        }
    }

    fn draft_from(descriptor: &TaskDescriptor) -> Draft {
        Draft::Email(EmailDraft {
            to: descriptor.param("recipient").to_string(),
            subject: descriptor.param("subject").to_string(),
            body: descriptor.param("body").to_string(),
        })
    }
}

#[async_trait]
impl TaskHandler for EmailHandler {
    fn task_type(&self) -> TaskType {
        TaskType::Email
    }

    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        if let Err(outcome) = self.gate.check(user_id, Service::Gmail) {
            return outcome;
        }

        match descriptor.action {
            // Both stage a draft; only a confirmed draft is ever delivered.
            TaskAction::Send | TaskAction::Compose => HandlerOutcome::NeedsConfirmation {
                draft: Self::draft_from(descriptor),
            },
            TaskAction::Search => {
                let query = descriptor.param("query");
                match self.mail.search(user_id, query, self.search_limit).await {
                    Ok(items) => HandlerOutcome::Results {
                        task_type: "email_search",
                        items,
                    },
                    Err(e) => HandlerOutcome::Failed {
                        task_type: "email",
                        error: e.to_string(),
                    },
                }
            }
            other => HandlerOutcome::Failed {
                task_type: "email",
                error: format!("Unknown email action: {}", other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attache_backends::{
        AuthHandleIssuer, CredentialStore, InMemoryCredentialStore, MockMail,
    };

    fn handler(granted: bool) -> (EmailHandler, Arc<MockMail>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        if granted {
            store.grant("user123", Service::Gmail);
        }
        let issuer = Arc::new(AuthHandleIssuer::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>
        ));
        let gate = Arc::new(AuthGate::new(store, issuer));
        let mail = Arc::new(MockMail::new());
        (
            EmailHandler::new(gate, Arc::clone(&mail) as Arc<dyn MailBackend>, 10),
            mail,
        )
    }

    fn descriptor(action: TaskAction) -> TaskDescriptor {
        TaskDescriptor {
            task_type: TaskType::Email,
            action,
            parameters: Default::default(),
            needs_confirmation: true,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn test_send_stages_draft() {
        let (handler, mail) = handler(true);
        let d = descriptor(TaskAction::Send)
            .with_param("recipient", "john@example.com")
            .with_param("subject", "Hi")
            .with_param("body", "Hello");

        let outcome = handler.handle(&d, "user123").await;
        match outcome {
            HandlerOutcome::NeedsConfirmation {
                draft: Draft::Email(email),
            } => {
                assert_eq!(email.to, "john@example.com");
                assert_eq!(email.subject, "Hi");
                assert_eq!(email.body, "Hello");
            }
            other => panic!("Expected staged email draft, got {:?}", other),
        }
        // Staging must not deliver anything.
        assert!(mail.sent("user123").is_empty());
    }

    #[tokio::test]
    async fn test_compose_stages_draft() {
        let (handler, _) = handler(true);
        let d = descriptor(TaskAction::Compose).with_param("recipient", "a@b.c");
        let outcome = handler.handle(&d, "user123").await;
        assert!(matches!(outcome, HandlerOutcome::NeedsConfirmation { .. }));
    }

    #[tokio::test]
    async fn test_search_returns_results() {
        let (handler, _) = handler(true);
        let d = descriptor(TaskAction::Search).with_param("query", "meeting");
        let outcome = handler.handle(&d, "user123").await;
        match outcome {
            HandlerOutcome::Results { task_type, items } => {
                assert_eq!(task_type, "email_search");
                assert_eq!(items.len(), 1);
            }
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_action_fails_structured() {
        let (handler, _) = handler(true);
        let outcome = handler.handle(&descriptor(TaskAction::Delete), "user123").await;
        match outcome {
            HandlerOutcome::Failed { task_type, error } => {
                assert_eq!(task_type, "email");
                assert_eq!(error, "Unknown email action: delete");
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let (handler, mail) = handler(false);
        let d = descriptor(TaskAction::Send).with_param("recipient", "a@b.c");

        let outcome = handler.handle(&d, "user123").await;
        match outcome {
            HandlerOutcome::AuthenticationRequired { service, .. } => {
                assert_eq!(service, Service::Gmail);
            }
            other => panic!("Expected AuthenticationRequired, got {:?}", other),
        }
        // Zero backend calls for the turn.
        assert!(mail.sent("user123").is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_blocks_search_too() {
        let (handler, _) = handler(false);
        let d = descriptor(TaskAction::Search).with_param("query", "meeting");
        let outcome = handler.handle(&d, "user123").await;
        assert!(matches!(
            outcome,
            HandlerOutcome::AuthenticationRequired { .. }
        ));
    }
}
