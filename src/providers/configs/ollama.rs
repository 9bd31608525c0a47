use std::time::Duration;

use super::base::ProviderConfig;
use crate::errors::{AgentError, AgentResult};

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3";
pub const OLLAMA_COMMAND: &str = "ollama";

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    /// Probe the server on construction and launch it when unreachable
    pub auto_start: bool,
    /// Executable invoked as `<command> serve`
    pub command: String,
    pub probe_timeout: Duration,
    /// How long to keep re-probing after launching the server
    pub startup_timeout: Duration,
    pub poll_interval: Duration,
}

impl OllamaProviderConfig {
    pub fn new(host: String, model: String) -> Self {
        Self {
            host,
            model,
            ..Self::default()
        }
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for OllamaProviderConfig {
    fn default() -> Self {
        Self {
            host: OLLAMA_HOST.to_string(),
            model: OLLAMA_MODEL.to_string(),
            auto_start: true,
            command: OLLAMA_COMMAND.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ProviderConfig for OllamaProviderConfig {
    fn from_env() -> AgentResult<Self> {
        let host = Self::get_env("OLLAMA_HOST", false, Some(OLLAMA_HOST.to_string()))?
            .unwrap_or_else(|| OLLAMA_HOST.to_string());

        let model = Self::get_env("OLLAMA_MODEL", false, Some(OLLAMA_MODEL.to_string()))?
            .unwrap_or_else(|| OLLAMA_MODEL.to_string());

        let auto_start = Self::get_env_flag("OLLAMA_AUTO_START", true)?;

        let command = Self::get_env("OLLAMA_COMMAND", false, Some(OLLAMA_COMMAND.to_string()))?
            .unwrap_or_else(|| OLLAMA_COMMAND.to_string());

        let startup_timeout = match Self::get_env("OLLAMA_STARTUP_TIMEOUT_SECS", false, None)? {
            Some(secs) => Duration::from_secs(secs.trim().parse().map_err(|_| {
                AgentError::Config(format!(
                    "OLLAMA_STARTUP_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?),
            None => DEFAULT_STARTUP_TIMEOUT,
        };

        Ok(Self::new(host, model)
            .with_auto_start(auto_start)
            .with_command(command)
            .with_startup_timeout(startup_timeout))
    }
}
