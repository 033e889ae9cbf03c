//! LLM integration module.
//!
//! Provides an OpenAI-compatible vision client, the extraction prompts, and
//! the [`VisionExtractor`] predictor built on them.

mod client;
mod extractor;
mod prompts;

pub use client::{LlmClient, Message};
pub use extractor::VisionExtractor;
pub use prompts::Prompts;
