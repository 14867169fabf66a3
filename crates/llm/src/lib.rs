//! LLM integration for tweetvec agents
//!
//! An OpenAI-compatible chat-completion client with retries, plus the prompts the agents need:
//! interest relevance, cringe scoring, in-persona replies and personality generation.

pub mod ai_types;
pub mod client;
mod cringe;
pub mod error;
mod persona;
mod profiles;
mod relevance;

pub use client::LlmClient;
pub use cringe::{CringeDetector, CringeLevel};
pub use error::LlmError;
pub use persona::{compose_reply, PersonaReply};
pub use profiles::{parse_personality_yaml, Evaluation, ProfileGenerator, SeedTraits};
pub use relevance::{check_relevance, Relevance};

#[cfg(test)]
mod retry_tests;
