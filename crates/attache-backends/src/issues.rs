//! Mock issue-tracker backend.

use async_trait::async_trait;

use attache_core::{BackendKind, SearchItem};

use crate::backend::{BackendError, CapabilityBackend};

/// Search-only issue backend with fixture issues.
pub struct MockIssues;

struct FixtureIssue {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    status: &'static str,
    assignee: &'static str,
    created_at: &'static str,
}

const ISSUES: &[FixtureIssue] = &[
    FixtureIssue {
        id: "issue_001",
        title: "Fix login bug",
        description: "Users are unable to login with certain credentials",
        status: "In Progress",
        assignee: "John Doe",
        created_at: "2024-01-15T09:00:00Z",
    },
    FixtureIssue {
        id: "issue_002",
        title: "Add dark mode support",
        description: "Implement dark mode theme for the application",
        status: "Todo",
        assignee: "Jane Smith",
        created_at: "2024-01-14T14:20:00Z",
    },
];

#[async_trait]
impl CapabilityBackend for MockIssues {
    fn kind(&self) -> BackendKind {
        BackendKind::Issues
    }

    async fn search(
        &self,
        _user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchItem>, BackendError> {
        let q = query.to_lowercase();
        let items = ISSUES
            .iter()
            .filter(|i| {
                i.title.to_lowercase().contains(&q) || i.description.to_lowercase().contains(&q)
            })
            .take(limit)
            .map(|i| SearchItem {
                id: i.id.to_string(),
                title: i.title.to_string(),
                snippet: format!("[{}] {} ({})", i.status, i.description, i.assignee),
                timestamp: i.created_at.to_string(),
                source: BackendKind::Issues,
            })
            .collect();
        Ok(items)
    }
}
