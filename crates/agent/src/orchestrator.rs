//! The bounded tool-calling loop around the language model.
//!
//! One inbound message drives at most `max_tool_rounds` model calls. Each
//! round either produces a final text reply or a batch of tool invocations
//! whose results are fed back for the next round. The loop never lets a
//! model or tool failure escape; the caller always gets text to send.

use std::sync::Arc;

use chrono::Utc;

use booking_agent_config::AgentConfig;
use booking_agent_core::conversation::{TokenUsage, Turn};
use booking_agent_core::domain::BusinessProfile;
use booking_agent_core::traits::ChatHistoryStore;
use booking_agent_llm::ChatBackend;
use booking_agent_scheduling::SchedulingOperations;
use booking_agent_tools::{tool_catalog, ToolDispatcher};

use crate::prompt::system_prompt;

/// Outcome of one orchestration run.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Text to send back to the customer. Empty only when the contact has
    /// the bot disabled.
    pub text: String,
    /// Token usage summed across every model call of the run.
    pub usage: TokenUsage,
}

/// Drives a conversation turn end to end: prompt assembly, the model loop,
/// tool dispatch, and history persistence.
pub struct ConversationOrchestrator {
    backend: Arc<dyn ChatBackend>,
    dispatcher: ToolDispatcher,
    operations: Arc<SchedulingOperations>,
    history: Arc<dyn ChatHistoryStore>,
    config: AgentConfig,
}

impl ConversationOrchestrator {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        operations: Arc<SchedulingOperations>,
        history: Arc<dyn ChatHistoryStore>,
        config: AgentConfig,
    ) -> Self {
        Self {
            backend,
            dispatcher: ToolDispatcher::new(operations.clone()),
            operations,
            history,
            config,
        }
    }

    /// Handle one inbound customer message.
    ///
    /// `persona` is the business's tone text, passed to the prompt builder
    /// as-is. Infrastructure failures degrade to the configured failure
    /// reply; a model that keeps requesting tools is cut off after the round
    /// bound with the best text produced so far.
    pub async fn handle_message(
        &self,
        profile: &BusinessProfile,
        persona: Option<&str>,
        phone: &str,
        message: &str,
    ) -> AgentReply {
        let contact = match self.operations.find_or_create_contact(phone).await {
            Ok(contact) => contact,
            Err(e) => {
                tracing::error!(error = %e, phone = %phone, "contact lookup failed");
                return AgentReply {
                    text: self.config.failure_reply.clone(),
                    usage: TokenUsage::default(),
                };
            }
        };

        if !contact.bot_enabled {
            tracing::debug!(contact = %contact.id, "bot disabled for contact, staying silent");
            return AgentReply {
                text: String::new(),
                usage: TokenUsage::default(),
            };
        }

        let active = match self.operations.active_appointment(&contact).await {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!(error = %e, "active appointment lookup failed");
                None
            }
        };

        let prior = match self.history.recent(phone, self.config.history_turns).await {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!(error = %e, "history fetch failed, continuing without it");
                Vec::new()
            }
        };

        let mut turns = Vec::with_capacity(prior.len() + 2);
        turns.push(Turn::system(system_prompt(
            profile,
            persona,
            &contact,
            active.as_ref(),
            Utc::now(),
        )));
        turns.extend(prior);
        turns.push(Turn::user(message));

        let reply = self.run_model_loop(profile, phone, turns).await;

        self.persist(phone, Turn::user(message)).await;
        self.persist(phone, Turn::assistant(reply.text.clone())).await;

        reply
    }

    async fn run_model_loop(
        &self,
        profile: &BusinessProfile,
        phone: &str,
        mut turns: Vec<Turn>,
    ) -> AgentReply {
        let tools = tool_catalog();
        let mut usage = TokenUsage::default();
        // Best text seen so far; the bound cutoff falls back to it.
        let mut candidate: Option<String> = None;

        for round in 0..self.config.max_tool_rounds {
            let response = match self.backend.chat(&turns, &tools).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, round = round, "model call failed");
                    return AgentReply {
                        text: self.config.failure_reply.clone(),
                        usage,
                    };
                }
            };

            usage.add(response.usage);

            if let Some(content) = response
                .content
                .as_deref()
                .filter(|c| !c.trim().is_empty())
            {
                candidate = Some(content.to_string());
            }

            if response.is_final() {
                let text = candidate.unwrap_or_else(|| self.config.fallback_reply.clone());
                return AgentReply { text, usage };
            }

            tracing::debug!(
                round = round,
                calls = response.tool_calls.len(),
                "executing tool round"
            );

            turns.push(Turn::assistant_with_calls(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            // Results go back in invocation order, each tied to its call id.
            for call in &response.tool_calls {
                let payload = self.dispatcher.execute(profile, phone, call).await;
                turns.push(Turn::tool_result(call.id.clone(), payload));
            }
        }

        tracing::warn!(
            max_rounds = self.config.max_tool_rounds,
            "tool round bound reached, cutting the model off"
        );

        AgentReply {
            text: candidate.unwrap_or_else(|| self.config.fallback_reply.clone()),
            usage,
        }
    }

    async fn persist(&self, phone: &str, turn: Turn) {
        if let Err(e) = self.history.append(phone, turn).await {
            tracing::warn!(error = %e, "history append failed");
        }
    }
}
