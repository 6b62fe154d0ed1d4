//! Recurring-event expansion.
//!
//! A recurrence request is expanded into a bounded, fixed-size series by
//! advancing a cursor by a fixed interval and issuing one creation call per
//! occurrence. "Monthly" is approximated as 30 days, not calendar-accurate.

use chrono::Duration;

use attache_backends::{parse_datetime, CalendarBackend};
use attache_core::CalendarDraft;

/// Supported recurrence patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// The fixed cursor step for this pattern.
    pub fn interval(&self) -> Duration {
        match self {
            Recurrence::Daily => Duration::days(1),
            Recurrence::Weekly => Duration::weeks(1),
            // Approximation: a fixed 30-day step.
            Recurrence::Monthly => Duration::days(30),
        }
    }
}

impl std::str::FromStr for Recurrence {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            _ => Err(format!("Unsupported recurrence pattern: {}", s)),
        }
    }
}

/// Expand a calendar draft into `count` occurrences.
///
/// Each occurrence's creation is independent: a failure on one does not
/// abort the rest. Returns the number of successful creations.
pub async fn expand_series(
    calendar: &dyn CalendarBackend,
    user_id: &str,
    draft: &CalendarDraft,
    recurrence: Recurrence,
    count: usize,
) -> Result<usize, String> {
    let start = parse_datetime(&draft.date, &draft.time).map_err(|e| e.to_string())?;

    let mut cursor = start;
    let mut created = 0;
    for i in 0..count {
        let occurrence = CalendarDraft {
            title: format!("{} (Recurring {})", draft.title, i + 1),
            date: cursor.format("%Y-%m-%d").to_string(),
            time: cursor.format("%H:%M").to_string(),
            description: draft.description.clone(),
        };

        match calendar.create_event(user_id, &occurrence).await {
            Ok(receipt) if receipt.success => created += 1,
            Ok(receipt) => {
                tracing::warn!(
                    user_id,
                    occurrence = i + 1,
                    error = receipt.error.as_deref().unwrap_or("unknown"),
                    "Occurrence creation failed"
                );
            }
            Err(e) => {
                tracing::warn!(user_id, occurrence = i + 1, error = %e, "Occurrence creation failed");
            }
        }

        cursor += recurrence.interval();
    }

    Ok(created)
}
