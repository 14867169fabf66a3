use tweetvec_core::Personality;

use crate::ai_types::{ChatRequest, Message};
use crate::client::LlmClient;
use crate::error::LlmError;

const THINK_SYSTEM_PROMPT: &str =
    "You are an AI agent responding to tweets. Think through your response step by step.";
const REPLY_SYSTEM_PROMPT: &str = "Generate a tweet response.";
const REPLY_MAX_TOKENS: u32 = 100;

/// The two model outputs behind one agent reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaReply {
    pub thought: String,
    pub reply: String,
}

/// Composes a reply to `tweet` in the voice of `personality`: a reasoning step, then the reply.
///
/// # Errors
/// Any client error, or `InvalidOutput` when the model returns an empty reply.
pub async fn compose_reply(
    client: &LlmClient,
    personality: &Personality,
    tweet: &str,
) -> Result<PersonaReply, LlmError> {
    let think_prompt = format!(
        "Tweet: {tweet}\n\nYour personality:\n{}\n\
         Think through how you would respond to this tweet given your personality. \
         Consider what stands out to you and what tone fits.",
        personality.summary()
    );
    let think = ChatRequest::new(
        client.model(),
        vec![Message::system(THINK_SYSTEM_PROMPT), Message::user(think_prompt)],
    )
    .temperature(0.7);
    let thought = client.chat_completion(&think).await?;
    tracing::debug!(agent = %personality.name, "Reasoning step complete");

    let reply_prompt = format!(
        "Based on the analysis, generate a tweet response as {name}.\n\n\
         Tweet: {tweet}\n\nAnalysis: {thought}\n\nPersonality:\n{summary}\n\
         Make it tweet-length appropriate and interesting.",
        name = personality.name,
        summary = personality.summary(),
    );
    let reply_request = ChatRequest::new(
        client.model(),
        vec![Message::system(REPLY_SYSTEM_PROMPT), Message::user(reply_prompt)],
    )
    .temperature(0.7)
    .max_tokens(REPLY_MAX_TOKENS);
    let raw = client.chat_completion(&reply_request).await?;

    let reply = clean_reply(&raw);
    if reply.is_empty() {
        return Err(LlmError::InvalidOutput("empty reply".to_owned()));
    }
    Ok(PersonaReply { thought, reply })
}

/// Trims whitespace and one pair of wrapping quotes.
fn clean_reply(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_owned()
}
