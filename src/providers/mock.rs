use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::errors::AgentResult;
use crate::providers::base::{Generation, Provider};
use crate::providers::types::message::Message;

/// A mock provider that returns pre-configured replies and records chat requests
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<Vec<String>>,
    pub received: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    fn next_reply(&self) -> String {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            String::new()
        } else {
            replies.remove(0)
        }
    }
}

impl Provider for MockProvider {
    fn from_env() -> AgentResult<Self> {
        Ok(Self::default())
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn generate(&self, _prompt: &str, _stream: bool) -> AgentResult<Generation> {
        Ok(Generation::Text(self.next_reply()))
    }

    fn chat(&self, messages: &[Message]) -> AgentResult<String> {
        self.received.lock().unwrap().push(messages.to_vec());
        Ok(self.next_reply())
    }

    fn list_models(&self) -> AgentResult<BTreeSet<String>> {
        Ok(BTreeSet::from(["mock".to_string()]))
    }
}
