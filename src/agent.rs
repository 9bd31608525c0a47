use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::providers::base::Provider;

/// Freeform key-value memory; no schema is imposed on the values.
pub type Memory = HashMap<String, Value>;

/// State every agent carries: its name, the shared provider, and its own memory.
pub struct BaseAgent {
    name: String,
    model: Arc<dyn Provider>,
    memory: Memory,
}

impl BaseAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn Provider>, memory: Option<Memory>) -> Self {
        Self {
            name: name.into(),
            model,
            memory: memory.unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Arc<dyn Provider> {
        &self.model
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Store a value, replacing whatever was under the same key
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.memory.insert(key.into(), value.into());
    }

    pub fn recall(&self, key: &str) -> Option<&Value> {
        self.memory.get(key)
    }

    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }
}

impl fmt::Debug for BaseAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseAgent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("memory_keys", &self.memory.len())
            .finish()
    }
}

/// Contract every concrete agent satisfies.
///
/// Implementors only provide access to their [`BaseAgent`] and a `respond`
/// implementation; memory management comes for free.
pub trait Agent {
    fn base(&self) -> &BaseAgent;

    fn base_mut(&mut self) -> &mut BaseAgent;

    /// Answer a user query, typically by consulting the provider
    fn respond(&mut self, query: &str) -> AgentResult<String>;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn model(&self) -> &Arc<dyn Provider> {
        self.base().model()
    }

    fn remember(&mut self, key: &str, value: Value) {
        self.base_mut().remember(key, value);
    }

    fn recall(&self, key: &str) -> Option<&Value> {
        self.base().recall(key)
    }

    fn clear_memory(&mut self) {
        self.base_mut().clear_memory();
    }

    /// Diagnostic rendering such as `TutorAgent(name=ada, model=OllamaProvider { .. })`
    fn describe(&self) -> String
    where
        Self: Sized,
    {
        let type_name = std::any::type_name::<Self>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        format!("{}(name={}, model={:?})", short, self.name(), self.model())
    }
}

type Responder = Box<dyn FnMut(&mut BaseAgent, &str) -> AgentResult<String> + Send>;

/// Agent whose `respond` is a closure supplied through [`AgentBuilder`]
pub struct FnAgent {
    base: BaseAgent,
    responder: Responder,
}

impl Agent for FnAgent {
    fn base(&self) -> &BaseAgent {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseAgent {
        &mut self.base
    }

    fn respond(&mut self, query: &str) -> AgentResult<String> {
        (self.responder)(&mut self.base, query)
    }
}

impl fmt::Debug for FnAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAgent").field("base", &self.base).finish_non_exhaustive()
    }
}

/// Builds agents without declaring a new type.
///
/// Building without a responder is the abstract agent form and fails with
/// [`AgentError::Instantiation`].
pub struct AgentBuilder {
    name: String,
    model: Arc<dyn Provider>,
    memory: Option<Memory>,
    responder: Option<Responder>,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>, model: Arc<dyn Provider>) -> Self {
        Self {
            name: name.into(),
            model,
            memory: None,
            responder: None,
        }
    }

    pub fn memory(mut self, memory: Memory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: FnMut(&mut BaseAgent, &str) -> AgentResult<String> + Send + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    pub fn build(self) -> AgentResult<FnAgent> {
        let responder = self.responder.ok_or_else(|| {
            AgentError::Instantiation(format!(
                "agent '{}' has no respond implementation",
                self.name
            ))
        })?;

        Ok(FnAgent {
            base: BaseAgent::new(self.name, self.model, self.memory),
            responder,
        })
    }
}
