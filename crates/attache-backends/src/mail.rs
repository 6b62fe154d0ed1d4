//! Mock mail backend.
//!
//! A keyed in-memory mailbox: a seeded fixture inbox shared by every user
//! plus a per-user outbox of delivered messages. Stands in for a real mail
//! provider behind the `MailBackend` trait.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use attache_core::{ActionReceipt, BackendKind, EmailDraft, SearchItem};

use crate::backend::{BackendError, CapabilityBackend, MailBackend};

/// A stored email, inbox or outbox.
#[derive(Clone, Debug)]
pub struct StoredEmail {
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub snippet: String,
    pub date: String,
}

/// In-memory mail backend with a fixture inbox and per-user outboxes.
pub struct MockMail {
    outbox: Mutex<HashMap<String, Vec<StoredEmail>>>,
}

impl MockMail {
    pub fn new() -> Self {
        Self {
            outbox: Mutex::new(HashMap::new()),
        }
    }

    /// Fixture inbox returned for every user.
    fn fixture_inbox() -> Vec<StoredEmail> {
        vec![
            StoredEmail {
                id: "email_001".to_string(),
                sender: "john@example.com".to_string(),
                recipient: "me".to_string(),
                subject: "Meeting Tomorrow".to_string(),
                snippet: "Hi, just confirming our meeting tomorrow at 2pm...".to_string(),
                date: "2024-01-15T14:30:00Z".to_string(),
            },
            StoredEmail {
                id: "email_002".to_string(),
                sender: "sarah@company.com".to_string(),
                recipient: "me".to_string(),
                subject: "Project Update".to_string(),
                snippet: "Here's the latest update on the project...".to_string(),
                date: "2024-01-15T10:15:00Z".to_string(),
            },
        ]
    }

    /// Look up an inbox email by id.
    pub fn get_email(&self, email_id: &str) -> Option<StoredEmail> {
        Self::fixture_inbox().into_iter().find(|e| e.id == email_id)
    }

    /// Build a reply draft for an inbox email: `Re:` subject, addressed to
    /// the original sender.
    pub fn reply_draft(&self, email_id: &str, reply_body: &str) -> Option<EmailDraft> {
        let original = self.get_email(email_id)?;
        Some(EmailDraft {
            to: original.sender,
            subject: format!("Re: {}", original.subject),
            body: reply_body.to_string(),
        })
    }

    /// Build a forward draft for an inbox email: `Fwd:` subject with the
    /// original quoted below any additional text.
    pub fn forward_draft(&self, email_id: &str, to: &str, additional_text: &str) -> Option<EmailDraft> {
        let original = self.get_email(email_id)?;
        let body = format!(
            "{}\n\n---------- Forwarded message ---------\nFrom: {}\nDate: {}\nSubject: {}\n\n{}",
            additional_text, original.sender, original.date, original.subject, original.snippet
        );
        Some(EmailDraft {
            to: to.to_string(),
            subject: format!("Fwd: {}", original.subject),
            body: body.trim().to_string(),
        })
    }

    /// Messages delivered on behalf of `user_id`, in send order.
    pub fn sent(&self, user_id: &str) -> Vec<StoredEmail> {
        self.outbox
            .lock()
            .map(|o| o.get(user_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn matches(email: &StoredEmail, query: &str) -> bool {
        let q = query.to_lowercase();
        email.subject.to_lowercase().contains(&q)
            || email.snippet.to_lowercase().contains(&q)
            || email.sender.to_lowercase().contains(&q)
    }
}

impl Default for MockMail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityBackend for MockMail {
    fn kind(&self) -> BackendKind {
        BackendKind::Mail
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchItem>, BackendError> {
        let mut candidates = Self::fixture_inbox();
        candidates.extend(self.sent(user_id));

        let items = candidates
            .iter()
            .filter(|e| Self::matches(e, query))
            .take(limit)
            .map(|e| SearchItem {
                id: e.id.clone(),
                title: e.subject.clone(),
                snippet: e.snippet.clone(),
                timestamp: e.date.clone(),
                source: BackendKind::Mail,
            })
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl MailBackend for MockMail {
    async fn send(
        &self,
        user_id: &str,
        draft: &EmailDraft,
    ) -> Result<ActionReceipt, BackendError> {
        if draft.to.is_empty() {
            return Ok(ActionReceipt::failed("Recipient must not be empty"));
        }

        let message_id = format!("msg_{}", Uuid::new_v4().simple());
        let email = StoredEmail {
            id: message_id.clone(),
            sender: format!("{}@attache.local", user_id),
            recipient: draft.to.clone(),
            subject: draft.subject.clone(),
            snippet: draft.body.clone(),
            date: chrono::Utc::now().to_rfc3339(),
        };

        let mut outbox = self
            .outbox
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("Lock poisoned: {}", e)))?;
        outbox.entry(user_id.to_string()).or_default().push(email);

        tracing::info!(user_id, to = %draft.to, message_id = %message_id, "Email delivered");
        Ok(ActionReceipt::ok(message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(to: &str) -> EmailDraft {
        EmailDraft {
            to: to.to_string(),
            subject: "Hi".to_string(),
            body: "Hello there".to_string(),
        }
    }

    // ---- Search ----

    #[tokio::test]
    async fn test_search_matches_subject() {
        let mail = MockMail::new();
        let results = mail.search("user123", "meeting", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "email_001");
        assert_eq!(results[0].source, BackendKind::Mail);
    }

    #[tokio::test]
    async fn test_search_matches_sender() {
        let mail = MockMail::new();
        let results = mail.search("user123", "sarah@company.com", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Project Update");
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let mail = MockMail::new();
        let results = mail.search("user123", "zzzzz", 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let mail = MockMail::new();
        // Both fixtures match the empty query.
        let results = mail.search("user123", "", 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_includes_sent_messages() {
        let mail = MockMail::new();
        mail.send(
            "user123",
            &EmailDraft {
                to: "bob@example.com".to_string(),
                subject: "Quarterly numbers".to_string(),
                body: "Attached".to_string(),
            },
        )
        .await
        .unwrap();

        let results = mail.search("user123", "quarterly", 10).await.unwrap();
        assert_eq!(results.len(), 1);

        // Another user's search does not see it.
        let other = mail.search("user456", "quarterly", 10).await.unwrap();
        assert!(other.is_empty());
    }

    // ---- Send ----

    #[tokio::test]
    async fn test_send_returns_message_id() {
        let mail = MockMail::new();
        let receipt = mail.send("user123", &draft("john@example.com")).await.unwrap();
        assert!(receipt.success);
        assert!(receipt.external_id.unwrap().starts_with("msg_"));
    }

    #[tokio::test]
    async fn test_send_records_outbox() {
        let mail = MockMail::new();
        mail.send("user123", &draft("john@example.com")).await.unwrap();
        let sent = mail.sent("user123");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "john@example.com");
        assert_eq!(sent[0].subject, "Hi");
    }

    #[tokio::test]
    async fn test_send_empty_recipient_fails() {
        let mail = MockMail::new();
        let receipt = mail.send("user123", &draft("")).await.unwrap();
        assert!(!receipt.success);
        assert!(receipt.error.unwrap().contains("Recipient"));
    }

    #[tokio::test]
    async fn test_send_ids_are_unique() {
        let mail = MockMail::new();
        let a = mail.send("u", &draft("a@b.c")).await.unwrap();
        let b = mail.send("u", &draft("a@b.c")).await.unwrap();
        assert_ne!(a.external_id, b.external_id);
    }

    // ---- Reply / forward composition ----

    #[test]
    fn test_reply_draft() {
        let mail = MockMail::new();
        let reply = mail.reply_draft("email_001", "Works for me.").unwrap();
        assert_eq!(reply.to, "john@example.com");
        assert_eq!(reply.subject, "Re: Meeting Tomorrow");
        assert_eq!(reply.body, "Works for me.");
    }

    #[test]
    fn test_forward_draft_quotes_original() {
        let mail = MockMail::new();
        let fwd = mail
            .forward_draft("email_002", "boss@company.com", "FYI")
            .unwrap();
        assert_eq!(fwd.to, "boss@company.com");
        assert_eq!(fwd.subject, "Fwd: Project Update");
        assert!(fwd.body.starts_with("FYI"));
        assert!(fwd.body.contains("Forwarded message"));
        assert!(fwd.body.contains("From: sarah@company.com"));
    }

    #[test]
    fn test_reply_draft_unknown_email() {
        let mail = MockMail::new();
        assert!(mail.reply_draft("email_999", "hello").is_none());
    }

    #[test]
    fn test_kind() {
        assert_eq!(MockMail::new().kind(), BackendKind::Mail);
    }
}
