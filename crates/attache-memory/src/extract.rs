//! Heuristic extraction of user preferences, writing style, and topics.
//!
//! Cheap lexical heuristics applied on every recorded interaction. These are
//! deliberately shallow; they feed the user context served to the classifier
//! and conversation layer, nothing more.

use std::collections::HashMap;

/// Topic buckets and the keywords that map into them.
const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("work", &["job", "work", "office", "meeting", "project", "deadline"]),
    ("family", &["family", "mom", "dad", "sister", "brother", "parents"]),
    ("health", &["doctor", "health", "medical", "appointment", "exercise"]),
    ("travel", &["trip", "vacation", "flight", "hotel", "travel"]),
    ("finance", &["money", "budget", "payment", "bill", "expense"]),
];

/// Maximum number of important topics kept per user.
const MAX_TOPICS: usize = 10;

/// Maximum summary parts retained (user + agent lines count separately).
const MAX_SUMMARY_PARTS: usize = 5;

/// Characters kept of each message when folded into the summary.
const SUMMARY_SNIPPET_CHARS: usize = 100;

/// Update communication preferences from one user message.
pub fn extract_preferences(message: &str, preferences: &mut HashMap<String, String>) {
    let lower = message.to_lowercase();

    if lower.contains("don't") || lower.contains("stop") {
        if lower.contains("notifications") {
            preferences.insert("notifications".to_string(), "false".to_string());
        }
        if lower.contains("emails") {
            preferences.insert("email_notifications".to_string(), "false".to_string());
        }
    }

    if lower.contains("morning") {
        preferences.insert("preferred_time".to_string(), "morning".to_string());
    } else if lower.contains("evening") {
        preferences.insert("preferred_time".to_string(), "evening".to_string());
    }

    let char_count = message.chars().count();
    if char_count > 0 && char_count < 20 {
        preferences.insert("prefers_concise".to_string(), "true".to_string());
    } else if char_count > 100 {
        preferences.insert("prefers_detailed".to_string(), "true".to_string());
    }
}

/// Update writing-style observations from one user message.
pub fn extract_writing_style(message: &str, style: &mut HashMap<String, String>) {
    let has_cased = message.chars().any(|c| c.is_alphabetic());

    if has_cased && message.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_lowercase()) {
        style.insert("uses_lowercase".to_string(), "true".to_string());
    } else if has_cased
        && message.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase())
    {
        style.insert("uses_uppercase".to_string(), "true".to_string());
    }

    if message.contains("!!") {
        style.insert("uses_double_exclamation".to_string(), "true".to_string());
    }
    if message.contains("...") {
        style.insert("uses_ellipsis".to_string(), "true".to_string());
    }

    let total = message.chars().count();
    let non_ascii = message.chars().filter(|c| !c.is_ascii()).count();
    if non_ascii > 0 && total > 0 {
        style.insert("uses_emojis".to_string(), "true".to_string());
        style.insert(
            "emoji_frequency".to_string(),
            format!("{:.2}", non_ascii as f64 / total as f64),
        );
    }
}

/// Fold topic-bucket hits from one user message into the topic list.
///
/// The list is order-preserving, deduplicated, and capped at `MAX_TOPICS`.
pub fn extract_topics(message: &str, topics: &mut Vec<String>) {
    let lower = message.to_lowercase();
    for (topic, keywords) in TOPIC_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) && !topics.iter().any(|t| t == topic) {
            topics.push((*topic).to_string());
        }
    }
    topics.truncate(MAX_TOPICS);
}

/// Fold one interaction into the rolling summary.
///
/// The summary is a " | "-joined list of truncated "User:"/"Agent:" lines,
/// bounded at `MAX_SUMMARY_PARTS` parts (oldest dropped first).
pub fn update_summary(current: &str, user_message: &str, response: &str) -> String {
    let mut parts: Vec<String> = if current.is_empty() {
        Vec::new()
    } else {
        current.split(" | ").map(str::to_string).collect()
    };

    if !user_message.is_empty() {
        parts.push(format!("User: {}", snippet(user_message)));
    }
    if !response.is_empty() {
        parts.push(format!("Agent: {}", snippet(response)));
    }

    if parts.len() > MAX_SUMMARY_PARTS {
        parts.drain(..parts.len() - MAX_SUMMARY_PARTS);
    }
    parts.join(" | ")
}

/// Truncate to a char-boundary-safe snippet, marking elision.
fn snippet(s: &str) -> String {
    if s.chars().count() <= SUMMARY_SNIPPET_CHARS {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(SUMMARY_SNIPPET_CHARS).collect();
        format!("{}...", truncated)
    }
}
