use std::collections::BTreeSet;
use std::io::BufReader;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response}; // blocking API, every call runs on the caller's thread
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{
    base::{Generation, Provider},
    configs::{OllamaProviderConfig, ProviderConfig},
    stream::ResponseStream,
    types::message::Message,
    utils::{chat_response_content, generate_response_text, tags_to_model_names},
};
use crate::errors::{AgentError, AgentResult};

/// Where the server stood when the provider finished constructing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Auto-start was disabled, so the server was never probed
    Unprobed,
    /// The server answered the first probe
    Reachable,
    /// The server was launched by this provider and later answered a probe
    Launched,
}

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
    availability: Availability,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        let mut provider = Self {
            client,
            config,
            availability: Availability::Unprobed,
        };

        if provider.config.auto_start {
            provider.availability = provider.ensure_running()?;
        }

        Ok(provider)
    }

    pub fn base_url(&self) -> &str {
        self.config.host.trim_end_matches('/')
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Lightweight reachability check; any transport failure counts as unreachable.
    fn is_running(&self) -> bool {
        match self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.config.probe_timeout)
            .send()
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(error = %e, "ollama probe failed");
                false
            }
        }
    }

    fn ensure_running(&self) -> AgentResult<Availability> {
        if self.is_running() {
            return Ok(Availability::Reachable);
        }

        let deadline = Instant::now()
            .checked_add(self.config.startup_timeout)
            .ok_or_else(|| {
                AgentError::Config(format!(
                    "startup timeout {:?} is too large",
                    self.config.startup_timeout
                ))
            })?;

        warn!(host = %self.base_url(), "ollama is not running, starting it now");
        self.start_server()?;
        self.wait_until_running(deadline)?;
        Ok(Availability::Launched)
    }

    /// Launch `<command> serve` detached. The child is never awaited or killed.
    fn start_server(&self) -> AgentResult<()> {
        let child = Command::new(&self.config.command)
            .arg("serve")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AgentError::Startup(format!("{} serve: {}", self.config.command, e)))?;

        info!(pid = child.id(), command = %self.config.command, "launched ollama server");
        Ok(())
    }

    fn wait_until_running(&self, deadline: Instant) -> AgentResult<()> {
        loop {
            thread::sleep(self.config.poll_interval);
            if self.is_running() {
                info!(host = %self.base_url(), "ollama server is reachable");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AgentError::Startup(format!(
                    "server at {} did not become reachable within {:?}",
                    self.base_url(),
                    self.config.startup_timeout
                )));
            }
        }
    }

    fn check_status(response: Response) -> AgentResult<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            status => {
                let body = response.text()?;
                Err(AgentError::Backend { status, body })
            }
        }
    }

    /// Decode a JSON body; malformed payloads surface as `AgentError::Json`.
    fn read_json(response: Response) -> AgentResult<Value> {
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn get(&self, path: &str) -> AgentResult<Response> {
        debug!(endpoint = path, "GET");
        let response = self.client.get(self.url(path)).send()?;
        Self::check_status(response)
    }

    fn post(&self, path: &str, payload: &Value) -> AgentResult<Response> {
        debug!(endpoint = path, model = %self.config.model, "POST");
        let response = self.client.post(self.url(path)).json(payload).send()?;
        Self::check_status(response)
    }
}

impl std::fmt::Debug for OllamaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaProvider")
            .field("base_url", &self.base_url())
            .field("model", &self.config.model)
            .finish()
    }
}

impl Provider for OllamaProvider {
    fn from_env() -> AgentResult<Self> {
        let config = OllamaProviderConfig::from_env()?;
        Self::new(config)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn generate(&self, prompt: &str, stream: bool) -> AgentResult<Generation> {
        let payload = json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": stream
        });

        let response = self.post("/api/generate", &payload)?;

        if stream {
            return Ok(Generation::Stream(ResponseStream::new(BufReader::new(
                response,
            ))));
        }

        let body = Self::read_json(response)?;
        Ok(Generation::Text(generate_response_text(&body)))
    }

    fn chat(&self, messages: &[Message]) -> AgentResult<String> {
        let payload = json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false
        });

        let body = Self::read_json(self.post("/api/chat", &payload)?)?;
        Ok(chat_response_content(&body))
    }

    fn list_models(&self) -> AgentResult<BTreeSet<String>> {
        let body = Self::read_json(self.get("/api/tags")?)?;
        Ok(tags_to_model_names(body)?)
    }
}
