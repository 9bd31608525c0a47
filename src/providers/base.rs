use std::collections::BTreeSet;
use std::fmt::Debug;

use super::stream::ResponseStream;
use super::types::message::Message;
use crate::errors::AgentResult;

/// Result of a generate call: the full text, or a live stream of chunks.
#[derive(Debug)]
pub enum Generation {
    Text(String),
    Stream(ResponseStream),
}

impl Generation {
    /// Collapse either variant into a single string, draining the stream if needed.
    pub fn into_text(self) -> AgentResult<String> {
        match self {
            Generation::Text(text) => Ok(text),
            Generation::Stream(stream) => stream.text_chunks().collect(),
        }
    }
}

/// Base trait for model-serving backends (Ollama, etc)
pub trait Provider: Debug + Send + Sync {
    /// Create a provider instance from environment variables
    fn from_env() -> AgentResult<Self>
    where
        Self: Sized;

    /// Identifier of the backend model every request addresses
    fn model(&self) -> &str;

    /// Complete a single prompt, blocking unless `stream` is set
    fn generate(&self, prompt: &str, stream: bool) -> AgentResult<Generation>;

    /// Continue a conversation; messages are sent in the given order
    fn chat(&self, messages: &[Message]) -> AgentResult<String>;

    /// Names of the models the backend can serve
    fn list_models(&self) -> AgentResult<BTreeSet<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_text_generation_into_text() -> AgentResult<()> {
        let generation = Generation::Text("Paris".to_string());
        assert_eq!(generation.into_text()?, "Paris");
        Ok(())
    }

    #[test]
    fn test_stream_generation_into_text() -> AgentResult<()> {
        let body = "{\"response\":\"Hel\"}\n{\"response\":\"lo\",\"done\":true}\n";
        let generation = Generation::Stream(ResponseStream::new(Cursor::new(body)));
        assert_eq!(generation.into_text()?, "Hello");
        Ok(())
    }
}
