//! Conversation controller: the user-facing entry point.
//!
//! Decides, per message, whether to answer directly, resolve a pending
//! confirmation, or delegate to the task router; formats whatever comes
//! back; and records the interaction in memory.

use std::sync::Arc;

use attache_core::config::AttacheConfig;
use attache_core::{Interaction, UserContext};
use attache_memory::MemoryStore;
use attache_task::{
    ConfirmationEngine, HandlerOutcome, IntentClassifier, ReactionSignal, TaskRouter, TaskType,
};

use crate::error::ChatError;
use crate::response;

/// Canned reply for purely conversational messages. Personality-grade text
/// generation is an external concern.
const CONVERSATIONAL_FALLBACK: &str =
    "I'm best at email, calendar, search, and reminders. What can I take off your plate?";

/// Central conversation controller wiring classifier, router, confirmation
/// engine, and memory.
pub struct ConversationController {
    classifier: Arc<dyn IntentClassifier>,
    router: TaskRouter,
    engine: ConfirmationEngine,
    memory: Arc<dyn MemoryStore>,
    config: AttacheConfig,
}

impl ConversationController {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        router: TaskRouter,
        engine: ConfirmationEngine,
        memory: Arc<dyn MemoryStore>,
        config: AttacheConfig,
    ) -> Self {
        Self {
            classifier,
            router,
            engine,
            memory,
            config,
        }
    }

    /// Handle an inbound user message and return the display reply.
    pub async fn handle_message(&self, user_id: &str, message: &str) -> Result<String, ChatError> {
        if !self.config.chat.enabled {
            return Err(ChatError::Disabled);
        }
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.len() > self.config.chat.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.chat.max_message_length));
        }

        // A reaction to an outstanding draft takes precedence over routing.
        let has_pending = self
            .engine
            .pending(user_id)
            .ok()
            .flatten()
            .is_some();
        if has_pending && ReactionSignal::classify(message) != ReactionSignal::Unrecognized {
            let resolution = self.engine.resolve(user_id, message).await;
            let reply = response::format_resolution(&resolution);
            self.record(user_id, message, &reply);
            return Ok(reply);
        }

        // Context defaults to empty on persistence failure; the conversation
        // never aborts over a context miss.
        let context = self.context_or_empty(user_id);
        let descriptor = self.classifier.classify(message, &context);

        let reply = if descriptor.task_type == TaskType::Other {
            CONVERSATIONAL_FALLBACK.to_string()
        } else {
            let outcome = self.router.route(&descriptor, user_id).await;
            match outcome {
                HandlerOutcome::NeedsConfirmation { draft } => {
                    match self.engine.stage(user_id, draft) {
                        Ok(staged) => response::format_draft(&staged),
                        Err(e) => {
                            tracing::warn!(user_id, error = %e, "Failed to stage draft");
                            format!("Sorry, I couldn't stage that action: {}", e)
                        }
                    }
                }
                other => response::format_outcome(&other, self.config.search.display_limit),
            }
        };

        self.record(user_id, message, &reply);
        Ok(reply)
    }

    /// Handle a bare reaction (e.g. an emoji tapback) against the user's
    /// pending confirmation.
    pub async fn handle_reaction(&self, user_id: &str, reaction: &str) -> String {
        let resolution = self.engine.resolve(user_id, reaction).await;
        response::format_resolution(&resolution)
    }

    fn context_or_empty(&self, user_id: &str) -> UserContext {
        match self.memory.get_context(user_id) {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Memory unreachable, using empty context");
                UserContext::default()
            }
        }
    }

    fn record(&self, user_id: &str, message: &str, reply: &str) {
        if let Err(e) = self
            .memory
            .put_interaction(user_id, Interaction::new(message, reply))
        {
            tracing::warn!(user_id, error = %e, "Failed to record interaction");
        }
    }
}
