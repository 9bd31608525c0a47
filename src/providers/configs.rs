pub mod base;
pub mod ollama;

pub use base::ProviderConfig;
pub use ollama::OllamaProviderConfig;
