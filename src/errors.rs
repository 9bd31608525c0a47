use reqwest::StatusCode;
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Cannot instantiate agent: {0}")]
    Instantiation(String),

    #[error("Failed to start backend: {0}")]
    Startup(String),

    #[error("Connection to backend failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Backend API error ({status}): {body}")]
    Backend { status: StatusCode, body: String },

    #[error("Failed to read response stream: {0}")]
    Stream(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
