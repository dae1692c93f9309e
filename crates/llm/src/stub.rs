//! Scripted backend for deterministic orchestrator tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use booking_agent_core::conversation::Turn;
use booking_agent_core::llm_types::{ChatResponse, ToolDefinition};

use crate::backend::ChatBackend;
use crate::LlmError;

/// Replays a queue of scripted responses, one per `chat` call.
///
/// When the script runs out it keeps returning the configured exhausted
/// response, which lets tests drive a model that requests tools forever.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    exhausted: Box<dyn Fn() -> Result<ChatResponse, LlmError> + Send + Sync>,
    calls: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedBackend {
    /// Script that falls back to a plain-text reply once exhausted.
    pub fn new(responses: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            exhausted: Box::new(|| {
                Ok(ChatResponse {
                    content: Some("(script exhausted)".to_string()),
                    ..Default::default()
                })
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script that repeats `response` forever after the queue drains.
    pub fn looping(
        responses: Vec<Result<ChatResponse, LlmError>>,
        repeated: ChatResponse,
    ) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            exhausted: Box::new(move || Ok(repeated.clone())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of chat calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// The turn sequences each call was given, for prompt assertions.
    pub fn recorded_calls(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(
        &self,
        turns: &[Turn],
        _tools: &[ToolDefinition],
    ) -> Result<ChatResponse, LlmError> {
        self.calls.lock().push(turns.to_vec());
        match self.script.lock().pop_front() {
            Some(response) => response,
            None => (self.exhausted)(),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
