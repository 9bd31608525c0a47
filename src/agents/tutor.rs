use serde_json::{json, Value};
use std::sync::Arc;

use crate::agent::{Agent, BaseAgent, Memory};
use crate::errors::AgentResult;
use crate::providers::base::Provider;
use crate::providers::types::message::Message;

pub const DEFAULT_TUTOR_PROMPT: &str = "You are a patient tutor. Explain concepts step by step, \
check the student's understanding, and keep answers short unless asked for detail.";

const HISTORY_KEY: &str = "history";

/// Conversational agent that keeps the running dialogue in its memory.
///
/// The transcript lives under the `history` key, so `clear_memory` also
/// starts a fresh conversation.
pub struct TutorAgent {
    base: BaseAgent,
    system_prompt: String,
}

impl TutorAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn Provider>) -> Self {
        Self::with_memory(name, model, None)
    }

    pub fn with_memory(
        name: impl Into<String>,
        model: Arc<dyn Provider>,
        memory: Option<Memory>,
    ) -> Self {
        Self {
            base: BaseAgent::new(name, model, memory),
            system_prompt: DEFAULT_TUTOR_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Previous turns, oldest first
    pub fn history(&self) -> AgentResult<Vec<Message>> {
        match self.recall(HISTORY_KEY) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }
}

impl Agent for TutorAgent {
    fn base(&self) -> &BaseAgent {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAgent {
        &mut self.base
    }

    fn respond(&mut self, query: &str) -> AgentResult<String> {
        let mut history = self.history()?;
        history.push(Message::user(query));

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend(history.iter().cloned());

        let reply = self.model().chat(&messages)?;

        history.push(Message::assistant(reply.as_str()));
        let history: Value = serde_json::to_value(&history)?;
        self.remember(HISTORY_KEY, history);
        self.remember("last_query", json!(query));
        self.remember("last_response", json!(reply));

        Ok(reply)
    }
}
