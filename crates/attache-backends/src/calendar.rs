//! Mock calendar backend.
//!
//! Keyed per-user event store with create/delete/search and an
//! upcoming-events window. Date/time parsing accepts `YYYY-MM-DD` and
//! `MM/DD/YYYY` dates with 24-hour `HH:MM` times.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use attache_core::{ActionReceipt, BackendKind, CalendarDraft, SearchItem};

use crate::backend::{BackendError, CalendarBackend, CapabilityBackend};

/// A stored calendar event.
#[derive(Clone, Debug)]
pub struct StoredEvent {
    pub id: String,
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
}

/// Parse a `date` + `time` pair into a naive datetime.
///
/// Dates: `YYYY-MM-DD` or `MM/DD/YYYY`. Times: 24-hour `HH:MM`.
pub fn parse_datetime(date: &str, time: &str) -> Result<NaiveDateTime, BackendError> {
    let date_obj = if date.contains('/') {
        NaiveDate::parse_from_str(date, "%m/%d/%Y")
    } else {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
    }
    .map_err(|_| BackendError::InvalidFields(format!("Invalid date format: {}", date)))?;

    let time_obj = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| BackendError::InvalidFields(format!("Invalid time format: {}", time)))?;

    Ok(date_obj.and_time(time_obj))
}

/// In-memory calendar backend with per-user event stores.
pub struct MockCalendar {
    events: Mutex<HashMap<String, Vec<StoredEvent>>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
        }
    }

    /// All events for a user, in creation order.
    pub fn events_for(&self, user_id: &str) -> Vec<StoredEvent> {
        self.events
            .lock()
            .map(|e| e.get(user_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn matches(event: &StoredEvent, query: &str) -> bool {
        let q = query.to_lowercase();
        event.title.to_lowercase().contains(&q) || event.description.to_lowercase().contains(&q)
    }

    fn to_item(event: &StoredEvent) -> SearchItem {
        SearchItem {
            id: event.id.clone(),
            title: event.title.clone(),
            snippet: event.description.clone(),
            timestamp: event.start_time.clone(),
            source: BackendKind::Calendar,
        }
    }
}

impl Default for MockCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CapabilityBackend for MockCalendar {
    fn kind(&self) -> BackendKind {
        BackendKind::Calendar
    }

    async fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchItem>, BackendError> {
        let events = self.events_for(user_id);
        let items = events
            .iter()
            .filter(|e| Self::matches(e, query))
            .take(limit)
            .map(Self::to_item)
            .collect();
        Ok(items)
    }
}

#[async_trait]
impl CalendarBackend for MockCalendar {
    async fn create_event(
        &self,
        user_id: &str,
        draft: &CalendarDraft,
    ) -> Result<ActionReceipt, BackendError> {
        let start = match parse_datetime(&draft.date, &draft.time) {
            Ok(dt) => dt,
            Err(e) => return Ok(ActionReceipt::failed(e.to_string())),
        };
        // Default one-hour duration.
        let end = start + Duration::hours(1);

        let event_id = format!("event_{}", Uuid::new_v4().simple());
        let event = StoredEvent {
            id: event_id.clone(),
            title: draft.title.clone(),
            start_time: start.and_utc().to_rfc3339(),
            end_time: end.and_utc().to_rfc3339(),
            description: draft.description.clone(),
        };

        let mut events = self
            .events
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("Lock poisoned: {}", e)))?;
        events.entry(user_id.to_string()).or_default().push(event);

        tracing::info!(user_id, title = %draft.title, event_id = %event_id, "Event created");
        Ok(ActionReceipt::ok(event_id))
    }

    async fn delete_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<ActionReceipt, BackendError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| BackendError::Unavailable(format!("Lock poisoned: {}", e)))?;

        let user_events = events.entry(user_id.to_string()).or_default();
        match user_events.iter().position(|e| e.id == event_id) {
            Some(pos) => {
                user_events.remove(pos);
                Ok(ActionReceipt::ok(event_id))
            }
            None => Ok(ActionReceipt::failed("Event not found")),
        }
    }

    async fn upcoming_events(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<SearchItem>, BackendError> {
        let now = Utc::now();
        let cutoff = now + Duration::days(days);

        let mut upcoming: Vec<(DateTime<Utc>, SearchItem)> = self
            .events_for(user_id)
            .iter()
            .filter_map(|e| {
                let start = DateTime::parse_from_rfc3339(&e.start_time).ok()?;
                let start = start.with_timezone(&Utc);
                if start >= now && start <= cutoff {
                    Some((start, Self::to_item(e)))
                } else {
                    None
                }
            })
            .collect();

        upcoming.sort_by_key(|(start, _)| *start);
        Ok(upcoming.into_iter().map(|(_, item)| item).collect())
    }
}
