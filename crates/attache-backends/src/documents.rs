//! Mock document-search backend (workspace wiki pages).

use async_trait::async_trait;

use attache_core::{BackendKind, SearchItem};

use crate::backend::{BackendError, CapabilityBackend};

/// Search-only document backend with fixture pages.
pub struct MockDocuments;

struct FixturePage {
    id: &'static str,
    title: &'static str,
    content: &'static str,
    last_modified: &'static str,
}

const PAGES: &[FixturePage] = &[
    FixturePage {
        id: "doc_001",
        title: "Project Planning Document",
        content: "This document contains our project planning details...",
        last_modified: "2024-01-15T10:30:00Z",
    },
    FixturePage {
        id: "doc_002",
        title: "Meeting Notes - Q1 Planning",
        content: "Notes from our Q1 planning meeting...",
        last_modified: "2024-01-14T15:45:00Z",
    },
];

#[async_trait]
impl CapabilityBackend for MockDocuments {
    fn kind(&self) -> BackendKind {
        BackendKind::Documents
    }

    async fn search(
        &self,
        _user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchItem>, BackendError> {
        let q = query.to_lowercase();
        let items = PAGES
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&q) || p.content.to_lowercase().contains(&q)
            })
            .take(limit)
            .map(|p| SearchItem {
                id: p.id.to_string(),
                title: p.title.to_string(),
                snippet: p.content.to_string(),
                timestamp: p.last_modified.to_string(),
                source: BackendKind::Documents,
            })
            .collect();
        Ok(items)
    }
}
