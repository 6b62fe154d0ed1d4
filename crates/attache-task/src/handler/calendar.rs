//! Calendar task handler.
//!
//! Single-event creation stages a draft for confirmation. A recurrence
//! request expands into a bounded series immediately, reporting the success
//! count. Searching with no query falls back to the upcoming-events window.

use std::sync::Arc;

use async_trait::async_trait;

use attache_backends::{CalendarBackend, Service};
use attache_core::{CalendarDraft, Draft};

use crate::auth::AuthGate;
use crate::handler::TaskHandler;
use crate::recurrence::{expand_series, Recurrence};
use crate::types::{HandlerOutcome, TaskAction, TaskDescriptor, TaskType};

/// Days covered by the no-query calendar search.
const UPCOMING_WINDOW_DAYS: i64 = 7;

pub struct CalendarHandler {
    gate: Arc<AuthGate>,
    calendar: Arc<dyn CalendarBackend>,
    search_limit: usize,
    max_occurrences: usize,
}

impl CalendarHandler {
    pub fn new(
        gate: Arc<AuthGate>,
        calendar: Arc<dyn CalendarBackend>,
        search_limit: usize,
        max_occurrences: usize,
    ) -> Self {
        Self {
            gate,
            calendar,
            search_limit,
            max_occurrences,
        }
    }

    fn draft_from(descriptor: &TaskDescriptor) -> CalendarDraft {
        let title = descriptor.param("title");
        CalendarDraft {
            title: if title.is_empty() {
                "New Event".to_string()
            } else {
                title.to_string()
            },
            date: descriptor.param("date").to_string(),
            time: descriptor.param("time").to_string(),
            description: descriptor.param("description").to_string(),
        }
    }

    async fn handle_schedule(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let recurrence_param = descriptor.param("recurrence");
        if recurrence_param.is_empty() {
            // No recurrence requested; treat as a single-event creation.
            return HandlerOutcome::NeedsConfirmation {
                draft: Draft::Calendar(Self::draft_from(descriptor)),
            };
        }

        let recurrence: Recurrence = match recurrence_param.parse() {
            Ok(r) => r,
            Err(e) => {
                return HandlerOutcome::Failed {
                    task_type: "calendar",
                    error: e,
                }
            }
        };

        let draft = Self::draft_from(descriptor);
        match expand_series(
            self.calendar.as_ref(),
            user_id,
            &draft,
            recurrence,
            self.max_occurrences,
        )
        .await
        {
            Ok(created) => HandlerOutcome::Completed {
                task_type: "calendar_series_created",
                details: format!(
                    "Created {} of {} recurring events",
                    created, self.max_occurrences
                ),
                external_id: None,
            },
            Err(e) => HandlerOutcome::Failed {
                task_type: "calendar",
                error: e,
            },
        }
    }

    async fn handle_search(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let query = descriptor.param("query");
        let result = if query.is_empty() {
            self.calendar
                .upcoming_events(user_id, UPCOMING_WINDOW_DAYS)
                .await
        } else {
            self.calendar.search(user_id, query, self.search_limit).await
        };

        match result {
            Ok(items) => HandlerOutcome::Results {
                task_type: "calendar_search",
                items,
            },
            Err(e) => HandlerOutcome::Failed {
                task_type: "calendar",
                error: e.to_string(),
            },
        }
    }

    async fn handle_delete(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let event_id = descriptor.param("event_id");
        if event_id.is_empty() {
            return HandlerOutcome::Failed {
                task_type: "calendar",
                error: "Missing event_id parameter".to_string(),
            };
        }

        match self.calendar.delete_event(user_id, event_id).await {
            Ok(receipt) if receipt.success => HandlerOutcome::Completed {
                task_type: "calendar_deleted",
                details: format!("Event {} deleted", event_id),
                external_id: receipt.external_id,
            },
            Ok(receipt) => HandlerOutcome::Failed {
                task_type: "calendar",
                error: receipt
                    .error
                    .unwrap_or_else(|| "Backend reported failure".to_string()),
            },
            Err(e) => HandlerOutcome::Failed {
                task_type: "calendar",
                error: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl TaskHandler for CalendarHandler {
    fn task_type(&self) -> TaskType {
        TaskType::Calendar
    }

    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        if let Err(outcome) = self.gate.check(user_id, Service::Calendar) {
            return outcome;
        }

        match descriptor.action {
            TaskAction::Create => HandlerOutcome::NeedsConfirmation {
                draft: Draft::Calendar(Self::draft_from(descriptor)),
            },
            TaskAction::Schedule => self.handle_schedule(descriptor, user_id).await,
            TaskAction::Search => self.handle_search(descriptor, user_id).await,
            TaskAction::Delete => self.handle_delete(descriptor, user_id).await,
            other => HandlerOutcome::Failed {
                task_type: "calendar",
                error: format!("Unknown calendar action: {}", other),
            },
        }
    }
}
