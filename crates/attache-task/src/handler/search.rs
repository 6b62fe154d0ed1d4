//! Fan-out search handler.
//!
//! Issues the query concurrently against all four capability backends.
//! Each backend call is isolated: a failure contributes zero results and
//! never aborts the others. Successful results keep their source tag and
//! are concatenated in backend-declaration order.

use std::sync::Arc;

use async_trait::async_trait;

use attache_backends::CapabilityBackend;
use attache_core::SearchItem;

use crate::handler::TaskHandler;
use crate::types::{HandlerOutcome, TaskAction, TaskDescriptor, TaskType};

pub struct SearchHandler {
    mail: Arc<dyn CapabilityBackend>,
    calendar: Arc<dyn CapabilityBackend>,
    documents: Arc<dyn CapabilityBackend>,
    issues: Arc<dyn CapabilityBackend>,
    per_backend_limit: usize,
}

impl SearchHandler {
    pub fn new(
        mail: Arc<dyn CapabilityBackend>,
        calendar: Arc<dyn CapabilityBackend>,
        documents: Arc<dyn CapabilityBackend>,
        issues: Arc<dyn CapabilityBackend>,
        per_backend_limit: usize,
    ) -> Self {
        Self {
            mail,
            calendar,
            documents,
            issues,
            per_backend_limit,
        }
    }

    /// One isolated backend call: failures become empty contributions.
    async fn search_one(
        backend: &dyn CapabilityBackend,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Vec<SearchItem> {
        match backend.search(user_id, query, limit).await {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!(backend = %backend.kind(), error = %e, "Backend search failed");
                vec![]
            }
        }
    }
}

#[async_trait]
impl TaskHandler for SearchHandler {
    fn task_type(&self) -> TaskType {
        TaskType::Search
    }

    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        if descriptor.action != TaskAction::Search {
            return HandlerOutcome::Failed {
                task_type: "search",
                error: format!("Unknown search action: {}", descriptor.action),
            };
        }

        let query = descriptor.param("query");
        let limit = self.per_backend_limit;

        let (mut mail, calendar, documents, issues) = tokio::join!(
            Self::search_one(self.mail.as_ref(), user_id, query, limit),
            Self::search_one(self.calendar.as_ref(), user_id, query, limit),
            Self::search_one(self.documents.as_ref(), user_id, query, limit),
            Self::search_one(self.issues.as_ref(), user_id, query, limit),
        );

        // Merge in declaration order; no cross-source ranking or dedup.
        mail.extend(calendar);
        mail.extend(documents);
        mail.extend(issues);

        HandlerOutcome::Results {
            task_type: "search",
            items: mail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attache_backends::{
        BackendError, MockCalendar, MockDocuments, MockIssues, MockMail,
    };
    use attache_core::BackendKind;

    /// A backend that always fails its search.
    struct FailingBackend(BackendKind);

    #[async_trait]
    impl CapabilityBackend for FailingBackend {
        fn kind(&self) -> BackendKind {
            self.0
        }
        async fn search(
            &self,
            _user_id: &str,
            _query: &str,
            _limit: usize,
        ) -> Result<Vec<SearchItem>, BackendError> {
            Err(BackendError::Unavailable("boom".to_string()))
        }
    }

    fn descriptor(query: &str) -> TaskDescriptor {
        TaskDescriptor {
            task_type: TaskType::Search,
            action: TaskAction::Search,
            parameters: Default::default(),
            needs_confirmation: false,
            confidence: 0.9,
        }
        .with_param("query", query)
    }

    fn full_handler() -> SearchHandler {
        SearchHandler::new(
            Arc::new(MockMail::new()),
            Arc::new(MockCalendar::new()),
            Arc::new(MockDocuments),
            Arc::new(MockIssues),
            10,
        )
    }

    #[tokio::test]
    async fn test_fan_out_merges_in_declaration_order() {
        // "planning" hits documents; "meeting" hits mail and documents.
        let handler = full_handler();
        let outcome = handler.handle(&descriptor("meeting"), "user123").await;
        match outcome {
            HandlerOutcome::Results { task_type, items } => {
                assert_eq!(task_type, "search");
                // Mail fixture "Meeting Tomorrow" precedes the documents
                // fixture "Meeting Notes - Q1 Planning".
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].source, BackendKind::Mail);
                assert_eq!(items[1].source, BackendKind::Documents);
            }
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_backend_is_isolated() {
        let handler = SearchHandler::new(
            Arc::new(MockMail::new()),
            Arc::new(FailingBackend(BackendKind::Calendar)),
            Arc::new(MockDocuments),
            Arc::new(MockIssues),
            10,
        );

        let outcome = handler.handle(&descriptor("meeting"), "user123").await;
        match outcome {
            HandlerOutcome::Results { items, .. } => {
                // The merged set equals the union of the remaining three.
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].source, BackendKind::Mail);
                assert_eq!(items[1].source, BackendKind::Documents);
            }
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_all_backends_failing_yields_empty_results() {
        let handler = SearchHandler::new(
            Arc::new(FailingBackend(BackendKind::Mail)),
            Arc::new(FailingBackend(BackendKind::Calendar)),
            Arc::new(FailingBackend(BackendKind::Documents)),
            Arc::new(FailingBackend(BackendKind::Issues)),
            10,
        );

        let outcome = handler.handle(&descriptor("anything"), "user123").await;
        match outcome {
            HandlerOutcome::Results { items, .. } => assert!(items.is_empty()),
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_results_are_source_tagged() {
        let handler = full_handler();
        let outcome = handler.handle(&descriptor("login"), "user123").await;
        match outcome {
            HandlerOutcome::Results { items, .. } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].source, BackendKind::Issues);
            }
            other => panic!("Expected Results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_search_action_fails() {
        let handler = full_handler();
        let mut d = descriptor("x");
        d.action = TaskAction::Create;
        let outcome = handler.handle(&d, "user123").await;
        assert!(matches!(outcome, HandlerOutcome::Failed { .. }));
    }
}
