//! Trigger bookkeeping: reminders and email automations.
//!
//! Triggers are registered and listed here; nothing in this store evaluates
//! conditions or fires actions. `check` is a pull-based read for an
//! external scheduler.

use std::sync::Mutex;

use uuid::Uuid;

use attache_core::Timestamp;

use crate::types::{Trigger, TriggerType};

/// Errors from trigger store operations.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// The trigger does not exist or belongs to another user. The two cases
    /// are deliberately indistinguishable to the caller.
    #[error("Trigger not found or access denied: {0}")]
    NotFoundOrForbidden(Uuid),
    #[error("Trigger store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory trigger store with per-user ownership checks.
pub struct TriggerStore {
    triggers: Mutex<Vec<Trigger>>,
}

impl TriggerStore {
    pub fn new() -> Self {
        Self {
            triggers: Mutex::new(Vec::new()),
        }
    }

    /// Register a time-based reminder.
    ///
    /// A recurring reminder is recorded by prefixing the condition; the
    /// stored condition string is interpreted by the external scheduler.
    pub fn create_reminder(
        &self,
        user_id: &str,
        message: &str,
        trigger_time: &str,
        recurring: bool,
    ) -> Result<Trigger, TriggerError> {
        let condition = if recurring {
            format!("every {}", trigger_time)
        } else {
            trigger_time.to_string()
        };
        self.insert(Trigger {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            trigger_type: TriggerType::Reminder,
            condition,
            action: format!("Remind user: {}", message),
            active: true,
            created_at: Timestamp::now(),
        })
    }

    /// Register an email-condition automation.
    pub fn create_email_automation(
        &self,
        user_id: &str,
        condition: &str,
        action: &str,
    ) -> Result<Trigger, TriggerError> {
        self.insert(Trigger {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            trigger_type: TriggerType::EmailCondition,
            condition: condition.to_string(),
            action: action.to_string(),
            active: true,
            created_at: Timestamp::now(),
        })
    }

    /// Delete a trigger. Ownership is checked, never inferred: a trigger
    /// owned by another user reports the same error as a missing one.
    pub fn delete(&self, trigger_id: Uuid, user_id: &str) -> Result<(), TriggerError> {
        let mut triggers = self.lock()?;
        match triggers
            .iter()
            .position(|t| t.id == trigger_id && t.user_id == user_id)
        {
            Some(pos) => {
                triggers.remove(pos);
                Ok(())
            }
            None => Err(TriggerError::NotFoundOrForbidden(trigger_id)),
        }
    }

    /// Active triggers for a user, optionally filtered by type.
    ///
    /// A pure read: conditions are returned as-is, nothing is evaluated or
    /// fired.
    pub fn check(
        &self,
        user_id: &str,
        trigger_type: Option<TriggerType>,
    ) -> Result<Vec<Trigger>, TriggerError> {
        let triggers = self.lock()?;
        Ok(triggers
            .iter()
            .filter(|t| {
                t.user_id == user_id
                    && t.active
                    && trigger_type.map_or(true, |tt| t.trigger_type == tt)
            })
            .cloned()
            .collect())
    }

    fn insert(&self, trigger: Trigger) -> Result<Trigger, TriggerError> {
        let mut triggers = self.lock()?;
        triggers.push(trigger.clone());
        tracing::info!(
            user_id = %trigger.user_id,
            trigger_id = %trigger.id,
            trigger_type = %trigger.trigger_type,
            "Trigger registered"
        );
        Ok(trigger)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Trigger>>, TriggerError> {
        self.triggers
            .lock()
            .map_err(|e| TriggerError::Unavailable(format!("Lock poisoned: {}", e)))
    }
}

impl Default for TriggerStore {
    fn default() -> Self {
        Self::new()
    }
}
