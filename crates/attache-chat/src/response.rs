//! Response formatting for the conversation layer.
//!
//! Composes human-readable replies from handler outcomes, drafts, and
//! confirmation resolutions without requiring an LLM.

use attache_core::{Draft, SearchItem};
use attache_task::{HandlerOutcome, Resolution};

/// Render a staged draft as a confirmation card.
pub fn format_draft(draft: &Draft) -> String {
    match draft {
        Draft::Email(email) => format!(
            "📧 **Email Draft**\n\n**To:** {}\n**Subject:** {}\n\n**Message:**\n{}\n\nDoes this look good to send? 👍 or 👎",
            email.to, email.subject, email.body
        ),
        Draft::Calendar(event) => format!(
            "📅 **Calendar Event Draft**\n\n**Title:** {}\n**Date:** {}\n**Time:** {}\n**Description:** {}\n\nDoes this look good to create? 👍 or 👎",
            event.title, event.date, event.time, event.description
        ),
    }
}

/// Render a task completion line.
pub fn format_completion(task_type: &str, details: &str) -> String {
    match task_type {
        "email_sent" => format!("✅ Email sent successfully! {}", details),
        "calendar_created" => format!("✅ Calendar event created! {}", details),
        _ => format!("✅ {} completed! {}", humanize(task_type), details),
    }
}

/// Render merged search results as a numbered list, capped at `limit`.
pub fn format_results(items: &[SearchItem], limit: usize) -> String {
    if items.is_empty() {
        return "I couldn't find anything matching your request.".to_string();
    }

    let mut response = String::from("Here's what I found:\n\n");
    for (i, item) in items.iter().take(limit).enumerate() {
        response.push_str(&format!(
            "{}. [{}] {} - {}\n",
            i + 1,
            item.source,
            item.title,
            item.snippet
        ));
    }
    response.trim_end().to_string()
}

/// Render any handler outcome (drafts excluded: the controller stages those
/// before rendering the card).
pub fn format_outcome(outcome: &HandlerOutcome, display_limit: usize) -> String {
    match outcome {
        HandlerOutcome::Completed {
            task_type, details, ..
        } => format_completion(task_type, details),
        HandlerOutcome::Results { items, .. } => format_results(items, display_limit),
        HandlerOutcome::NeedsConfirmation { draft } => format_draft(draft),
        HandlerOutcome::AuthenticationRequired { instructions, .. } => instructions.clone(),
        HandlerOutcome::TriggerRegistered { details, .. } => format!("✅ {}", details),
        HandlerOutcome::Failed { error, .. } => {
            format!("Sorry, I couldn't do that: {}", error)
        }
    }
}

/// Render a confirmation resolution.
pub fn format_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Executed {
            task_type, details, ..
        } => format_completion(task_type, details),
        Resolution::ExecutionFailed { error } => {
            format!("Sorry, that didn't go through: {}", error)
        }
        Resolution::Cancelled => "Got it, I won't proceed with that.".to_string(),
        Resolution::Clarification => {
            "I'm not sure what that reaction means. Please use 👍 for yes or 👎 for no."
                .to_string()
        }
        Resolution::NothingPending => "I don't have anything pending for confirmation.".to_string(),
    }
}

/// "calendar_series_created" -> "Calendar series created".
fn humanize(task_type: &str) -> String {
    let spaced = task_type.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}
