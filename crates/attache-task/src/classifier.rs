//! Intent classification.
//!
//! The classifier is a pluggable strategy: the conversation layer only sees
//! the `IntentClassifier` trait, so the regex-based default can be swapped
//! for an LLM-backed one without touching routing logic. Malformed external
//! classifier output is recovered via `TaskDescriptor::from_classifier_json`.

use regex::Regex;

use attache_core::UserContext;

use crate::types::{TaskAction, TaskDescriptor, TaskType};

/// Classifies free text into a structured task descriptor.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str, context: &UserContext) -> TaskDescriptor;
}

/// A single compiled route pattern.
///
/// Capture groups map positionally onto `capture_params`; `fixed_params`
/// are set whenever the pattern matches.
struct RoutePattern {
    regex: Regex,
    task_type: TaskType,
    action: TaskAction,
    confidence: f32,
    needs_confirmation: bool,
    capture_params: &'static [&'static str],
    fixed_params: &'static [(&'static str, &'static str)],
}

/// Regex-based keyword classifier, compiled once and reused.
///
/// The highest-confidence matching pattern wins; earlier patterns win ties.
pub struct KeywordClassifier {
    patterns: Vec<RoutePattern>,
    email_address: Regex,
    iso_date: Regex,
    us_date: Regex,
    clock_time: Regex,
    recurrence_word: Regex,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        let table: Vec<(
            &str,
            TaskType,
            TaskAction,
            f32,
            bool,
            &'static [&'static str],
            &'static [(&'static str, &'static str)],
        )> = vec![
            // ---- Email ----
            (
                r"(?i)\bsend\s+(?:an?\s+)?email\s+to\s+(\S+)(?:\s+(?:about|regarding)\s+(.+))?$",
                TaskType::Email,
                TaskAction::Send,
                0.95,
                true,
                &["recipient", "subject"],
                &[],
            ),
            (
                r"(?i)\bemail\s+(\S+@\S+)(?:\s+(?:about|regarding)\s+(.+))?$",
                TaskType::Email,
                TaskAction::Send,
                0.90,
                true,
                &["recipient", "subject"],
                &[],
            ),
            (
                r"(?i)\bcompose\s+(?:an?\s+)?email(?:\s+to\s+(\S+))?",
                TaskType::Email,
                TaskAction::Compose,
                0.90,
                true,
                &["recipient"],
                &[],
            ),
            (
                r"(?i)\b(?:search|find|check)\s+(?:my\s+)?(?:emails?|inbox|mail)\b(?:\s+for\s+(.+))?",
                TaskType::Email,
                TaskAction::Search,
                0.92,
                false,
                &["query"],
                &[],
            ),
            // ---- Calendar ----
            (
                r"(?i)\bschedule\s+(?:an?\s+)?(?:(?:daily|weekly|monthly)\s+)?(?:meeting|event|call|appointment)\b(?:\s+(?:about|with|for)\s+(.+))?",
                TaskType::Calendar,
                TaskAction::Create,
                0.93,
                true,
                &["title"],
                &[],
            ),
            (
                r"(?i)\b(?:create|add)\s+(?:an?\s+)?(?:calendar\s+)?(?:(?:daily|weekly|monthly)\s+)?event\b(?:\s+(?:called|titled|for)\s+(.+))?",
                TaskType::Calendar,
                TaskAction::Create,
                0.92,
                true,
                &["title"],
                &[],
            ),
            (
                r"(?i)\bput\s+(.+?)\s+on\s+my\s+calendar\b",
                TaskType::Calendar,
                TaskAction::Create,
                0.90,
                true,
                &["title"],
                &[],
            ),
            (
                r"(?i)\bwhat(?:'s|\s+is)\s+on\s+my\s+calendar\b",
                TaskType::Calendar,
                TaskAction::Search,
                0.92,
                false,
                &[],
                &[],
            ),
            (
                r"(?i)\b(?:search|check)\s+(?:my\s+)?calendar\b(?:\s+for\s+(.+))?",
                TaskType::Calendar,
                TaskAction::Search,
                0.90,
                false,
                &["query"],
                &[],
            ),
            (
                r"(?i)\bcancel\s+event\s+(\S+)",
                TaskType::Calendar,
                TaskAction::Delete,
                0.90,
                false,
                &["event_id"],
                &[],
            ),
            // ---- Triggers ----
            (
                r"(?i)\bremind\s+me\s+to\s+(.+?)(?:\s+at\s+(.+))?$",
                TaskType::Trigger,
                TaskAction::Remind,
                0.95,
                false,
                &["message", "time"],
                &[],
            ),
            (
                r"(?i)\bset\s+(?:a\s+)?reminder\b(?:\s+(?:to|for)\s+(.+))?",
                TaskType::Trigger,
                TaskAction::Remind,
                0.93,
                false,
                &["message"],
                &[],
            ),
            (
                r"(?i)\bwhen(?:ever)?\s+i\s+(?:get|receive)\s+(?:an?\s+)?email\s+(.+?),?\s+then\s+(.+)",
                TaskType::Trigger,
                TaskAction::Create,
                0.90,
                false,
                &["condition", "action"],
                &[],
            ),
            (
                r"(?i)\b(?:create|set\s+up)\s+(?:an?\s+)?(?:email\s+)?automation\b",
                TaskType::Trigger,
                TaskAction::Create,
                0.88,
                false,
                &[],
                &[],
            ),
            (
                r"(?i)\bdelete\s+trigger\s+(\S+)",
                TaskType::Trigger,
                TaskAction::Delete,
                0.90,
                false,
                &["trigger_id"],
                &[],
            ),
            // ---- Integrations ----
            (
                r"(?i)\bsearch\s+notion\b(?:\s+for\s+(.+))?",
                TaskType::Integration,
                TaskAction::Search,
                0.93,
                false,
                &["query"],
                &[("service", "notion")],
            ),
            (
                r"(?i)\bsearch\s+linear\b(?:\s+for\s+(.+))?",
                TaskType::Integration,
                TaskAction::Search,
                0.93,
                false,
                &["query"],
                &[("service", "linear")],
            ),
            (
                r"(?i)\bconnect\s+(?:my\s+)?(\w+)\b",
                TaskType::Integration,
                TaskAction::Connect,
                0.85,
                false,
                &["service"],
                &[],
            ),
            // ---- Authentication ----
            (
                r"(?i)\b(?:authenticate|log\s*in|sign\s*in)\s+(?:with\s+|to\s+)?(\w+)",
                TaskType::Authentication,
                TaskAction::Authenticate,
                0.90,
                false,
                &["service"],
                &[],
            ),
            // ---- Generic search (low confidence catch-all) ----
            (
                r"(?i)\b(?:search|find|look)\s+(?:for\s+)?(.+)",
                TaskType::Search,
                TaskAction::Search,
                0.70,
                false,
                &["query"],
                &[],
            ),
        ];

        let patterns = table
            .into_iter()
            .map(
                |(pat, task_type, action, confidence, needs_confirmation, caps, fixed)| {
                    RoutePattern {
                        regex: Regex::new(pat).expect("Invalid route regex"),
                        task_type,
                        action,
                        confidence,
                        needs_confirmation,
                        capture_params: caps,
                        fixed_params: fixed,
                    }
                },
            )
            .collect();

        Self {
            patterns,
            email_address: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("Invalid email regex"),
            iso_date: Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("Invalid date regex"),
            us_date: Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\b").expect("Invalid date regex"),
            clock_time: Regex::new(r"\b(\d{1,2}:\d{2})\b").expect("Invalid time regex"),
            recurrence_word: Regex::new(r"(?i)\b(daily|weekly|monthly)\b")
                .expect("Invalid recurrence regex"),
        }
    }

    /// Fill parameters the matched pattern did not capture directly.
    fn enrich(&self, text: &str, descriptor: &mut TaskDescriptor) {
        // Recipient from any bare address when the email pattern missed it.
        if descriptor.task_type == TaskType::Email
            && !descriptor.parameters.contains_key("recipient")
        {
            if let Some(m) = self.email_address.find(text) {
                descriptor
                    .parameters
                    .insert("recipient".to_string(), m.as_str().to_string());
            }
        }

        if matches!(descriptor.task_type, TaskType::Calendar | TaskType::Trigger) {
            if !descriptor.parameters.contains_key("date") {
                let date = self
                    .iso_date
                    .captures(text)
                    .or_else(|| self.us_date.captures(text))
                    .map(|c| c[1].to_string());
                if let Some(date) = date {
                    descriptor.parameters.insert("date".to_string(), date);
                }
            }
            if !descriptor.parameters.contains_key("time") {
                if let Some(c) = self.clock_time.captures(text) {
                    descriptor
                        .parameters
                        .insert("time".to_string(), c[1].to_string());
                }
            }
        }

        if descriptor.task_type == TaskType::Calendar {
            if let Some(c) = self.recurrence_word.captures(text) {
                descriptor
                    .parameters
                    .insert("recurrence".to_string(), c[1].to_lowercase());
                // A recurrence request is a series expansion, not a single draft.
                descriptor.action = TaskAction::Schedule;
            }
        }
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str, _context: &UserContext) -> TaskDescriptor {
        let mut best: Option<(&RoutePattern, regex::Captures<'_>)> = None;

        for pattern in &self.patterns {
            if let Some(captures) = pattern.regex.captures(text) {
                let better = match &best {
                    Some((current, _)) => pattern.confidence > current.confidence,
                    None => true,
                };
                if better {
                    best = Some((pattern, captures));
                }
            }
        }

        let Some((pattern, captures)) = best else {
            // Conversational message; no task routing.
            return TaskDescriptor {
                task_type: TaskType::Other,
                action: TaskAction::Unknown,
                parameters: Default::default(),
                needs_confirmation: false,
                confidence: 0.2,
            };
        };

        let mut descriptor = TaskDescriptor {
            task_type: pattern.task_type,
            action: pattern.action,
            parameters: Default::default(),
            needs_confirmation: pattern.needs_confirmation,
            confidence: pattern.confidence,
        };

        for (i, name) in pattern.capture_params.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                let value = value.as_str().trim();
                if !value.is_empty() {
                    descriptor
                        .parameters
                        .insert((*name).to_string(), value.to_string());
                }
            }
        }
        for (name, value) in pattern.fixed_params {
            descriptor
                .parameters
                .insert((*name).to_string(), (*value).to_string());
        }

        self.enrich(text, &mut descriptor);

        tracing::debug!(
            task_type = %descriptor.task_type,
            action = %descriptor.action,
            confidence = descriptor.confidence,
            "Message classified"
        );
        descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> TaskDescriptor {
        KeywordClassifier::new().classify(text, &UserContext::default())
    }

    // ---- Email ----

    #[test]
    fn test_send_email_with_recipient_and_subject() {
        let d = classify("send an email to john@example.com about the quarterly review");
        assert_eq!(d.task_type, TaskType::Email);
        assert_eq!(d.action, TaskAction::Send);
        assert_eq!(d.param("recipient"), "john@example.com");
        assert_eq!(d.param("subject"), "the quarterly review");
        assert!(d.needs_confirmation);
        assert!(d.confidence > 0.9);
    }

    #[test]
    fn test_email_shorthand() {
        let d = classify("email sarah@company.com regarding lunch");
        assert_eq!(d.task_type, TaskType::Email);
        assert_eq!(d.action, TaskAction::Send);
        assert_eq!(d.param("recipient"), "sarah@company.com");
        assert_eq!(d.param("subject"), "lunch");
    }

    #[test]
    fn test_compose_email() {
        let d = classify("compose an email to bob@example.com");
        assert_eq!(d.action, TaskAction::Compose);
        assert_eq!(d.param("recipient"), "bob@example.com");
        assert!(d.needs_confirmation);
    }

    #[test]
    fn test_search_inbox() {
        let d = classify("check my inbox for invoices");
        assert_eq!(d.task_type, TaskType::Email);
        assert_eq!(d.action, TaskAction::Search);
        assert_eq!(d.param("query"), "invoices");
        assert!(!d.needs_confirmation);
    }

    // ---- Calendar ----

    #[test]
    fn test_schedule_meeting() {
        let d = classify("schedule a meeting with the design team on 2024-03-01 at 14:00");
        assert_eq!(d.task_type, TaskType::Calendar);
        assert_eq!(d.action, TaskAction::Create);
        assert!(d.param("title").starts_with("the design team"));
        assert_eq!(d.param("date"), "2024-03-01");
        assert_eq!(d.param("time"), "14:00");
        assert!(d.needs_confirmation);
    }

    #[test]
    fn test_us_date_extraction() {
        let d = classify("create an event for dinner on 3/15/2024 at 19:30");
        assert_eq!(d.task_type, TaskType::Calendar);
        assert_eq!(d.param("date"), "3/15/2024");
        assert_eq!(d.param("time"), "19:30");
    }

    #[test]
    fn test_whats_on_my_calendar() {
        let d = classify("what's on my calendar");
        assert_eq!(d.task_type, TaskType::Calendar);
        assert_eq!(d.action, TaskAction::Search);
        assert!(d.parameters.get("query").is_none());
    }

    #[test]
    fn test_recurring_event_becomes_schedule() {
        let d = classify("schedule a weekly meeting with the team at 09:00");
        assert_eq!(d.task_type, TaskType::Calendar);
        assert_eq!(d.action, TaskAction::Schedule);
        assert_eq!(d.param("recurrence"), "weekly");
    }

    #[test]
    fn test_cancel_event() {
        let d = classify("cancel event event_abc123");
        assert_eq!(d.task_type, TaskType::Calendar);
        assert_eq!(d.action, TaskAction::Delete);
        assert_eq!(d.param("event_id"), "event_abc123");
    }

    // ---- Triggers ----

    #[test]
    fn test_remind_me() {
        let d = classify("remind me to call Bob at 15:00");
        assert_eq!(d.task_type, TaskType::Trigger);
        assert_eq!(d.action, TaskAction::Remind);
        assert_eq!(d.param("message"), "call Bob");
        assert_eq!(d.param("time"), "15:00");
    }

    #[test]
    fn test_remind_me_without_time() {
        let d = classify("remind me to water the plants");
        assert_eq!(d.action, TaskAction::Remind);
        assert_eq!(d.param("message"), "water the plants");
        assert!(d.parameters.get("time").is_none());
    }

    #[test]
    fn test_email_automation_condition_action() {
        let d = classify("when I get an email from my boss, then flag it as urgent");
        assert_eq!(d.task_type, TaskType::Trigger);
        assert_eq!(d.action, TaskAction::Create);
        assert_eq!(d.param("condition"), "from my boss");
        assert_eq!(d.param("action"), "flag it as urgent");
    }

    #[test]
    fn test_delete_trigger() {
        let d = classify("delete trigger 550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(d.task_type, TaskType::Trigger);
        assert_eq!(d.action, TaskAction::Delete);
        assert_eq!(d.param("trigger_id"), "550e8400-e29b-41d4-a716-446655440000");
    }

    // ---- Integrations & authentication ----

    #[test]
    fn test_search_notion() {
        let d = classify("search notion for the planning doc");
        assert_eq!(d.task_type, TaskType::Integration);
        assert_eq!(d.action, TaskAction::Search);
        assert_eq!(d.param("service"), "notion");
        assert_eq!(d.param("query"), "the planning doc");
    }

    #[test]
    fn test_search_linear() {
        let d = classify("search linear for login bug");
        assert_eq!(d.param("service"), "linear");
    }

    #[test]
    fn test_connect_service() {
        let d = classify("connect my gmail");
        assert_eq!(d.task_type, TaskType::Integration);
        assert_eq!(d.action, TaskAction::Connect);
        assert_eq!(d.param("service"), "gmail");
    }

    #[test]
    fn test_authenticate() {
        let d = classify("sign in to calendar");
        assert_eq!(d.task_type, TaskType::Authentication);
        assert_eq!(d.action, TaskAction::Authenticate);
        assert_eq!(d.param("service"), "calendar");
    }

    // ---- Generic search ----

    #[test]
    fn test_generic_search() {
        let d = classify("find the budget spreadsheet");
        assert_eq!(d.task_type, TaskType::Search);
        assert_eq!(d.action, TaskAction::Search);
        assert_eq!(d.param("query"), "the budget spreadsheet");
    }

    #[test]
    fn test_specific_search_beats_generic() {
        // "search notion" matches both the notion and the generic pattern;
        // the higher-confidence integration route must win.
        let d = classify("search notion for roadmap");
        assert_eq!(d.task_type, TaskType::Integration);
    }

    // ---- Conversational fallthrough ----

    #[test]
    fn test_conversational_message() {
        let d = classify("hey, how's it going?");
        assert_eq!(d.task_type, TaskType::Other);
        assert_eq!(d.action, TaskAction::Unknown);
        assert!(!d.needs_confirmation);
        assert!(d.confidence < 0.5);
    }

    #[test]
    fn test_empty_message() {
        let d = classify("");
        assert_eq!(d.task_type, TaskType::Other);
    }
}
