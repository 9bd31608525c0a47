pub mod base;
pub mod configs;
pub mod ollama;
pub mod stream;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod mock;
