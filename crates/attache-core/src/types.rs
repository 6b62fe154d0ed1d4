use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// The capability backends a search can be fanned out to.
///
/// Declaration order is significant: merged fan-out results are concatenated
/// in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Mail search and delivery.
    Mail,
    /// Calendar event search and creation.
    Calendar,
    /// Document/page search (workspace wiki).
    Documents,
    /// Issue-tracker search.
    Issues,
}

impl BackendKind {
    /// All backends in fan-out declaration order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Mail,
        BackendKind::Calendar,
        BackendKind::Documents,
        BackendKind::Issues,
    ];
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Mail => write!(f, "mail"),
            BackendKind::Calendar => write!(f, "calendar"),
            BackendKind::Documents => write!(f, "documents"),
            BackendKind::Issues => write!(f, "issues"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mail" => Ok(BackendKind::Mail),
            "calendar" => Ok(BackendKind::Calendar),
            "documents" => Ok(BackendKind::Documents),
            "issues" => Ok(BackendKind::Issues),
            _ => Err(format!("Unknown backend kind: {}", s)),
        }
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Epoch-seconds timestamp used for all persisted times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

// =============================================================================
// Drafts & Pending Confirmations
// =============================================================================

/// A staged email awaiting user approval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// A staged calendar event awaiting user approval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
}

/// A staged side-effecting action awaiting user approval.
///
/// Handlers and the confirmation engine match exhaustively on the variant;
/// there are no string-keyed payload lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Draft {
    Email(EmailDraft),
    Calendar(CalendarDraft),
}

impl Draft {
    /// Short label used in user-facing task results.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Draft::Email(_) => "email",
            Draft::Calendar(_) => "calendar",
        }
    }
}

/// The persisted, at-most-one-per-user record of an unresolved draft.
///
/// Overwritten last-write-wins if a new draft arrives before resolution.
/// There is no TTL: an unresolved draft stays approvable indefinitely.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub draft: Draft,
    pub created_at: Timestamp,
}

impl PendingConfirmation {
    pub fn new(draft: Draft) -> Self {
        Self {
            draft,
            created_at: Timestamp::now(),
        }
    }
}

// =============================================================================
// Backend results
// =============================================================================

/// One item returned by a capability backend search, tagged with its source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub snippet: String,
    /// RFC 3339 timestamp string as reported by the backend.
    pub timestamp: String,
    pub source: BackendKind,
}

/// Result of executing an approved draft against a capability backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReceipt {
    pub success: bool,
    /// Backend-assigned id (message id, event id). Doubles as the idempotency
    /// key on crash-retry.
    pub external_id: Option<String>,
    pub error: Option<String>,
}

impl ActionReceipt {
    pub fn ok(external_id: impl Into<String>) -> Self {
        Self {
            success: true,
            external_id: Some(external_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Per-user context served to the classifier and conversation layer.
///
/// Defaults to empty when the memory store is unreachable; the conversation
/// must never abort on a context miss.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub preferences: HashMap<String, String>,
    pub writing_style: HashMap<String, String>,
    pub important_topics: Vec<String>,
    pub summary: String,
}

/// One conversational turn fed back into the memory store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_message: String,
    pub response: String,
    pub timestamp: Timestamp,
}

impl Interaction {
    pub fn new(user_message: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            response: response.into(),
            timestamp: Timestamp::now(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- BackendKind ----

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Mail.to_string(), "mail");
        assert_eq!(BackendKind::Calendar.to_string(), "calendar");
        assert_eq!(BackendKind::Documents.to_string(), "documents");
        assert_eq!(BackendKind::Issues.to_string(), "issues");
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("mail".parse::<BackendKind>().unwrap(), BackendKind::Mail);
        assert_eq!(
            "calendar".parse::<BackendKind>().unwrap(),
            BackendKind::Calendar
        );
        assert_eq!(
            "documents".parse::<BackendKind>().unwrap(),
            BackendKind::Documents
        );
        assert_eq!("issues".parse::<BackendKind>().unwrap(), BackendKind::Issues);
        assert!("invalid".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_backend_kind_all_order() {
        // Fan-out merge order depends on this exact declaration order.
        assert_eq!(
            BackendKind::ALL,
            [
                BackendKind::Mail,
                BackendKind::Calendar,
                BackendKind::Documents,
                BackendKind::Issues,
            ]
        );
    }

    #[test]
    fn test_backend_kind_serde_round_trip() {
        for kind in BackendKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            let rt: BackendKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, rt);
        }
    }

    // ---- Timestamp ----

    #[test]
    fn test_timestamp_now_is_recent() {
        let now = Timestamp::now();
        let chrono_now = Utc::now().timestamp();
        assert!((now.0 - chrono_now).abs() < 2);
    }

    #[test]
    fn test_timestamp_datetime_round_trip() {
        let ts = Timestamp(1700000000);
        let dt = ts.to_datetime();
        assert_eq!(Timestamp::from_datetime(dt), ts);
    }

    #[test]
    fn test_timestamp_ordering() {
        assert!(Timestamp(100) < Timestamp(200));
    }

    // ---- Draft ----

    #[test]
    fn test_draft_email_serde_tagged() {
        let draft = Draft::Email(EmailDraft {
            to: "john@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Hello there".to_string(),
        });
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains("\"type\":\"email\""));
        assert!(json.contains("\"to\":\"john@example.com\""));
        let rt: Draft = serde_json::from_str(&json).unwrap();
        assert_eq!(draft, rt);
    }

    #[test]
    fn test_draft_calendar_serde_tagged() {
        let draft = Draft::Calendar(CalendarDraft {
            title: "Team Meeting".to_string(),
            date: "2024-01-20".to_string(),
            time: "14:00".to_string(),
            description: "Weekly standup".to_string(),
        });
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains("\"type\":\"calendar\""));
        let rt: Draft = serde_json::from_str(&json).unwrap();
        assert_eq!(draft, rt);
    }

    #[test]
    fn test_draft_kind_label() {
        let email = Draft::Email(EmailDraft {
            to: String::new(),
            subject: String::new(),
            body: String::new(),
        });
        let calendar = Draft::Calendar(CalendarDraft {
            title: String::new(),
            date: String::new(),
            time: String::new(),
            description: String::new(),
        });
        assert_eq!(email.kind_label(), "email");
        assert_eq!(calendar.kind_label(), "calendar");
    }

    #[test]
    fn test_draft_rejects_unknown_tag() {
        let json = r#"{"type":"telegram","to":"x"}"#;
        assert!(serde_json::from_str::<Draft>(json).is_err());
    }

    // ---- PendingConfirmation ----

    #[test]
    fn test_pending_confirmation_new_sets_created_at() {
        let pending = PendingConfirmation::new(Draft::Email(EmailDraft {
            to: "a@b.c".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
        }));
        let now = Timestamp::now();
        assert!((pending.created_at.0 - now.0).abs() < 2);
    }

    #[test]
    fn test_pending_confirmation_serde_round_trip() {
        let pending = PendingConfirmation {
            draft: Draft::Calendar(CalendarDraft {
                title: "Dentist".to_string(),
                date: "2024-02-01".to_string(),
                time: "09:30".to_string(),
                description: String::new(),
            }),
            created_at: Timestamp(1700000000),
        };
        let json = serde_json::to_string(&pending).unwrap();
        let rt: PendingConfirmation = serde_json::from_str(&json).unwrap();
        assert_eq!(pending, rt);
    }

    // ---- ActionReceipt ----

    #[test]
    fn test_action_receipt_ok() {
        let receipt = ActionReceipt::ok("msg_42");
        assert!(receipt.success);
        assert_eq!(receipt.external_id.as_deref(), Some("msg_42"));
        assert!(receipt.error.is_none());
    }

    #[test]
    fn test_action_receipt_failed() {
        let receipt = ActionReceipt::failed("connection reset");
        assert!(!receipt.success);
        assert!(receipt.external_id.is_none());
        assert_eq!(receipt.error.as_deref(), Some("connection reset"));
    }

    // ---- SearchItem ----

    #[test]
    fn test_search_item_serde_round_trip() {
        let item = SearchItem {
            id: "email_001".to_string(),
            title: "Meeting Tomorrow".to_string(),
            snippet: "Just confirming our meeting tomorrow at 2pm".to_string(),
            timestamp: "2024-01-15T14:30:00Z".to_string(),
            source: BackendKind::Mail,
        };
        let json = serde_json::to_string(&item).unwrap();
        let rt: SearchItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, rt);
    }

    // ---- UserContext / Interaction ----

    #[test]
    fn test_user_context_default_is_empty() {
        let ctx = UserContext::default();
        assert!(ctx.preferences.is_empty());
        assert!(ctx.writing_style.is_empty());
        assert!(ctx.important_topics.is_empty());
        assert!(ctx.summary.is_empty());
    }

    #[test]
    fn test_interaction_new_sets_timestamp() {
        let interaction = Interaction::new("hi", "hello");
        assert_eq!(interaction.user_message, "hi");
        assert_eq!(interaction.response, "hello");
        let now = Timestamp::now();
        assert!((interaction.timestamp.0 - now.0).abs() < 2);
    }
}
