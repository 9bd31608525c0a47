use std::env;

use crate::errors::{AgentError, AgentResult};

pub trait ProviderConfig {
    /// Load configuration from environment variables
    fn from_env() -> AgentResult<Self>
    where
        Self: Sized;

    /// Helper function to get environment variables with error handling
    fn get_env(key: &str, required: bool, default: Option<String>) -> AgentResult<Option<String>> {
        match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) if !required => Ok(default),
            Err(env::VarError::NotPresent) => Err(AgentError::Config(format!(
                "Environment variable '{}' is required but not set.",
                key
            ))),
            Err(e) => Err(AgentError::Config(format!("{}: {}", key, e))),
        }
    }

    /// Read an optional boolean flag, accepting `true`/`false`/`1`/`0`
    fn get_env_flag(key: &str, default: bool) -> AgentResult<bool> {
        match Self::get_env(key, false, None)? {
            None => Ok(default),
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(AgentError::Config(format!(
                    "Environment variable '{}' must be true or false, got '{}'",
                    key, other
                ))),
            },
        }
    }
}
