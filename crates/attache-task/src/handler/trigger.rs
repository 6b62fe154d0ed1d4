//! Trigger task handler.
//!
//! Registers reminders and email automations, and deletes triggers on
//! behalf of their owner. Trigger listing is exposed through the store's
//! pull-based `check`, not through a task action.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::handler::TaskHandler;
use crate::trigger::{TriggerError, TriggerStore};
use crate::types::{HandlerOutcome, TaskAction, TaskDescriptor, TaskType};

pub struct TriggerHandler {
    triggers: Arc<TriggerStore>,
}

impl TriggerHandler {
    pub fn new(triggers: Arc<TriggerStore>) -> Self {
        Self { triggers }
    }

    fn handle_remind(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let message = descriptor.param("message");
        let time = descriptor.param("time");
        let recurring = descriptor.param("recurring") == "true";

        match self
            .triggers
            .create_reminder(user_id, message, time, recurring)
        {
            Ok(trigger) => HandlerOutcome::TriggerRegistered {
                trigger_id: trigger.id,
                details: if time.is_empty() {
                    "Reminder set for the specified time".to_string()
                } else {
                    format!("Reminder set for {}", time)
                },
            },
            Err(e) => HandlerOutcome::Failed {
                task_type: "trigger",
                error: e.to_string(),
            },
        }
    }

    fn handle_automation(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let condition = descriptor.param("condition");
        let action = descriptor.param("action");

        match self
            .triggers
            .create_email_automation(user_id, condition, action)
        {
            Ok(trigger) => HandlerOutcome::TriggerRegistered {
                trigger_id: trigger.id,
                details: "Email automation created".to_string(),
            },
            Err(e) => HandlerOutcome::Failed {
                task_type: "trigger",
                error: e.to_string(),
            },
        }
    }

    fn handle_delete(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        let raw_id = descriptor.param("trigger_id");
        let trigger_id = match Uuid::parse_str(raw_id) {
            Ok(id) => id,
            Err(_) => {
                return HandlerOutcome::Failed {
                    task_type: "trigger",
                    error: format!("Invalid trigger id: {}", raw_id),
                }
            }
        };

        match self.triggers.delete(trigger_id, user_id) {
            Ok(()) => HandlerOutcome::Completed {
                task_type: "trigger_deleted",
                details: format!("Trigger {} deleted", trigger_id),
                external_id: Some(trigger_id.to_string()),
            },
            Err(TriggerError::NotFoundOrForbidden(_)) => HandlerOutcome::Failed {
                task_type: "trigger",
                error: "Trigger not found or access denied".to_string(),
            },
            Err(e) => HandlerOutcome::Failed {
                task_type: "trigger",
                error: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl TaskHandler for TriggerHandler {
    fn task_type(&self) -> TaskType {
        TaskType::Trigger
    }

    async fn handle(&self, descriptor: &TaskDescriptor, user_id: &str) -> HandlerOutcome {
        match descriptor.action {
            TaskAction::Remind => self.handle_remind(descriptor, user_id),
            TaskAction::Create | TaskAction::Schedule => {
                self.handle_automation(descriptor, user_id)
            }
            TaskAction::Delete => self.handle_delete(descriptor, user_id),
            other => HandlerOutcome::Failed {
                task_type: "trigger",
                error: format!("Unknown trigger action: {}", other),
            },
        }
    }
}
