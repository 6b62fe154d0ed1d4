//! Core types for the task-execution engine.
//!
//! Defines task descriptors, triggers, handler outcomes, and their
//! supporting enumerations.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use attache_core::{Draft, SearchItem, Timestamp};
use attache_backends::Service;

// =============================================================================
// Enums
// =============================================================================

/// Task families the classifier can route a message into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Email,
    Calendar,
    Search,
    Trigger,
    Integration,
    Authentication,
    Other,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Email => write!(f, "email"),
            TaskType::Calendar => write!(f, "calendar"),
            TaskType::Search => write!(f, "search"),
            TaskType::Trigger => write!(f, "trigger"),
            TaskType::Integration => write!(f, "integration"),
            TaskType::Authentication => write!(f, "authentication"),
            TaskType::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(TaskType::Email),
            "calendar" => Ok(TaskType::Calendar),
            "search" => Ok(TaskType::Search),
            "trigger" => Ok(TaskType::Trigger),
            "integration" => Ok(TaskType::Integration),
            "authentication" => Ok(TaskType::Authentication),
            "other" => Ok(TaskType::Other),
            _ => Err(format!("Unknown task type: {}", s)),
        }
    }
}

/// The specific action requested within a task family.
///
/// Each handler interprets its own subset; an action a handler does not
/// recognize yields a structured failure, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Send,
    Compose,
    Search,
    Create,
    Delete,
    Update,
    Schedule,
    Remind,
    Connect,
    Authenticate,
    Unknown,
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::Send => write!(f, "send"),
            TaskAction::Compose => write!(f, "compose"),
            TaskAction::Search => write!(f, "search"),
            TaskAction::Create => write!(f, "create"),
            TaskAction::Delete => write!(f, "delete"),
            TaskAction::Update => write!(f, "update"),
            TaskAction::Schedule => write!(f, "schedule"),
            TaskAction::Remind => write!(f, "remind"),
            TaskAction::Connect => write!(f, "connect"),
            TaskAction::Authenticate => write!(f, "authenticate"),
            TaskAction::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for TaskAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send" => Ok(TaskAction::Send),
            "compose" => Ok(TaskAction::Compose),
            "search" => Ok(TaskAction::Search),
            "create" => Ok(TaskAction::Create),
            "delete" => Ok(TaskAction::Delete),
            "update" => Ok(TaskAction::Update),
            "schedule" => Ok(TaskAction::Schedule),
            "remind" => Ok(TaskAction::Remind),
            "connect" => Ok(TaskAction::Connect),
            "authenticate" => Ok(TaskAction::Authenticate),
            "unknown" => Ok(TaskAction::Unknown),
            _ => Err(format!("Unknown task action: {}", s)),
        }
    }
}

/// Kinds of registered automations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Reminder,
    EmailCondition,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerType::Reminder => write!(f, "reminder"),
            TriggerType::EmailCondition => write!(f, "email_condition"),
        }
    }
}

impl std::str::FromStr for TriggerType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reminder" => Ok(TriggerType::Reminder),
            "email_condition" => Ok(TriggerType::EmailCondition),
            _ => Err(format!("Unknown trigger type: {}", s)),
        }
    }
}

// =============================================================================
// Task descriptor
// =============================================================================

/// Structured classification of a user message.
///
/// Produced once per inbound message by the intent classifier and never
/// persisted. Matches the JSON contract the classifier is asked to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub task_type: TaskType,
    pub action: TaskAction,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    pub needs_confirmation: bool,
    pub confidence: f32,
}

impl TaskDescriptor {
    /// The fallback descriptor used when classifier output is unusable.
    pub fn fallback() -> Self {
        Self {
            task_type: TaskType::Other,
            action: TaskAction::Unknown,
            parameters: HashMap::new(),
            needs_confirmation: true,
            confidence: 0.0,
        }
    }

    /// Parse classifier JSON output, recovering locally from malformed
    /// payloads with the fallback descriptor.
    pub fn from_classifier_json(raw: &str) -> Self {
        match serde_json::from_str::<TaskDescriptor>(raw) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed classifier output, using fallback");
                Self::fallback()
            }
        }
    }

    /// A parameter by key, or the empty string when absent.
    pub fn param(&self, key: &str) -> &str {
        self.parameters.get(key).map(String::as_str).unwrap_or("")
    }

    /// Builder-style parameter insertion, used by classifiers and tests.
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }
}

// =============================================================================
// Triggers
// =============================================================================

/// A registered automation owned by a user.
///
/// `condition` is stored as-is; evaluation belongs to an external scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: Uuid,
    pub user_id: String,
    pub trigger_type: TriggerType,
    pub condition: String,
    pub action: String,
    pub active: bool,
    pub created_at: Timestamp,
}

// =============================================================================
// Handler outcomes
// =============================================================================

/// Structured result of routing one task descriptor.
///
/// Every handler returns one of these; no error escapes the router as a
/// panic or raw `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// A side effect was performed and committed.
    Completed {
        task_type: &'static str,
        details: String,
        external_id: Option<String>,
    },
    /// A read-only query produced (possibly zero) items.
    Results {
        task_type: &'static str,
        items: Vec<SearchItem>,
    },
    /// A side-effecting action was staged and awaits user approval.
    NeedsConfirmation { draft: Draft },
    /// A delegated credential is missing; the user must authenticate first.
    AuthenticationRequired {
        service: Service,
        auth_handle: String,
        instructions: String,
    },
    /// An automation was registered.
    TriggerRegistered { trigger_id: Uuid, details: String },
    /// The request could not be handled; reported, never thrown.
    Failed {
        task_type: &'static str,
        error: String,
    },
}

// =============================================================================
// Tests
// =============================================================================
