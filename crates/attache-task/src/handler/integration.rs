//! Integration task handler.
//!
//! Service-parameterised search over the document and issue backends, plus
//! connect requests that short-circuit into an authentication challenge.

use std::sync::Arc;

use async_trait::async_trait;

use attache_backends::{CapabilityBackend, Service};

use crate::auth::AuthGate;
use crate::handler::TaskHandler;
use crate::types::{HandlerOutcome, TaskAction, TaskDescriptor, TaskType};

pub struct IntegrationHandler {
    gate: Arc<AuthGate>,
    documents: Arc<dyn CapabilityBackend>,
    issues: Arc<dyn CapabilityBackend>,
    search_limit: usize,
}

impl IntegrationHandler {
    pub fn new(
        gate: Arc<AuthGate>,
        documents: Arc<dyn CapabilityBackend>,
        issues: Arc<dyn CapabilityBackend>,
        search_limit: usize,
    ) -> Self {
        Self {
            gate,
            documents,
            issues,
            search_limit,
        }
    }

    async fn handle_search(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let service = descriptor.param("service");
        let query = descriptor.param("query");

        let (backend, task_type) = match service {
            "notion" => (&self.documents, "document_search"),
            "linear" => (&self.issues, "issue_search"),
            _ => {
                return HandlerOutcome::Failed {
                    task_type: "integration",
                    error: format!(
                        "Unknown integration or action: {}/{}",
                        service, descriptor.action
                    ),
                }
            }
        };

        match backend.search(user_id, query, self.search_limit).await {
            Ok(items) => HandlerOutcome::Results { task_type, items },
            Err(e) => HandlerOutcome::Failed {
                task_type: "integration",
                error: e.to_string(),
            },
        }
    }

    fn handle_connect(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let requested = descriptor.param("service");
        match Service::from_request(requested) {
            Some(service) => self.gate.challenge(user_id, service),
            None => HandlerOutcome::Failed {
                task_type: "integration",
                error: format!("Unsupported service: {}", requested),
            },
        }
    }
}

#[async_trait]
impl TaskHandler for IntegrationHandler {
    fn task_type(&self) -> TaskType {
        TaskType::Integration
    }

    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        match descriptor.action {
            TaskAction::Search => self.handle_search(descriptor, user_id).await,
            TaskAction::Connect => self.handle_connect(descriptor, user_id),
            other => HandlerOutcome::Failed {
                task_type: "integration",
                error: format!("Unknown integration action: {}", other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attache_backends::{
        AuthHandleIssuer, CredentialStore, InMemoryCredentialStore, MockDocuments, MockIssues,
    };

    fn handler() -> IntegrationHandler {
        let store = Arc::new(InMemoryCredentialStore::new());
        let issuer = Arc::new(AuthHandleIssuer::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>
        ));
        let gate = Arc::new(AuthGate::new(store, issuer));
        IntegrationHandler::new(gate, Arc::new(MockDocuments), Arc::new(MockIssues), 10)
    }

    fn descriptor(action: TaskAction) -> TaskDescriptor {
        TaskDescriptor {
            task_type: TaskType::Integration,
            action,
            parameters: Default::default(),
            needs_confirmation: false,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn test_notion_search_routes_to_documents() {
        let handler = handler();
        let d = descriptor(TaskAction::Search)
            .with_param("service", "notion")
            .with_param("query", "planning");

        match handler.handle(&d, "user123").await {
            HandlerOutcome::Results { task_type, items } => {
                assert_eq!(task_type, "document_search");
                assert_eq!(items.len(), 2);
            }
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_linear_search_routes_to_issues() {
        let handler = handler();
        let d = descriptor(TaskAction::Search)
            .with_param("service", "linear")
            .with_param("query", "login");

        match handler.handle(&d, "user123").await {
            HandlerOutcome::Results { task_type, items } => {
                assert_eq!(task_type, "issue_search");
                assert_eq!(items.len(), 1);
            }
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_service_fails_structured() {
        let handler = handler();
        let d = descriptor(TaskAction::Search).with_param("service", "spotify");
        match handler.handle(&d, "user123").await {
            HandlerOutcome::Failed { error, .. } => {
                assert_eq!(error, "Unknown integration or action: spotify/search")
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_issues_challenge() {
        let handler = handler();
        let d = descriptor(TaskAction::Connect).with_param("service", "notion");
        match handler.handle(&d, "user123").await {
            HandlerOutcome::AuthenticationRequired { service, .. } => {
                assert_eq!(service, Service::Notion)
            }
            other => panic!("Expected AuthenticationRequired, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connect_unsupported_service() {
        let handler = handler();
        let d = descriptor(TaskAction::Connect).with_param("service", "spotify");
        match handler.handle(&d, "user123").await {
            HandlerOutcome::Failed { error, .. } => {
                assert_eq!(error, "Unsupported service: spotify")
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_action_fails_structured() {
        let handler = handler();
        match handler.handle(&descriptor(TaskAction::Send), "user123").await {
            HandlerOutcome::Failed { error, .. } => {
                assert_eq!(error, "Unknown integration action: send")
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }
}
