//! gradewell-providers: text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini, OpenAI-compatible APIs,
//! and Ollama, each asking the service for JSON constrained to the grading
//! schema.

pub mod config;
pub mod error;
pub mod gemini;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{
    build_grader, create_provider, load_config, load_config_from, GradewellConfig, ProviderConfig,
};
pub use error::ProviderError;
