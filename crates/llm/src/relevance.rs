use tweetvec_core::Personality;

use crate::ai_types::{ChatRequest, Message};
use crate::client::LlmClient;
use crate::error::LlmError;

const RELEVANCE_SYSTEM_PROMPT: &str =
    "You must respond with either 'YES: <explanation>' or 'NO: <explanation>'";

/// Whether a tweet touches a personality's interests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relevance {
    pub relevant: bool,
    pub explanation: String,
}

impl Relevance {
    /// Reads a `YES: ...` / `NO: ...` answer. Anything not starting with `YES` is a no.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let relevant = trimmed.to_uppercase().starts_with("YES");
        let explanation = trimmed
            .split_once(':')
            .map_or(trimmed, |(_, rest)| rest)
            .trim()
            .to_owned();
        Self { relevant, explanation }
    }
}

fn describe_interests(personality: &Personality) -> String {
    let Some(interests) = &personality.interests else {
        return "No specific interests".to_owned();
    };
    let mut lines = Vec::new();
    if !interests.primary_topics.is_empty() {
        lines.push(format!("Topics: {}", interests.primary_topics.join(", ")));
    }
    if !interests.key_figures.is_empty() {
        lines.push(format!("Key figures: {}", interests.key_figures.join(", ")));
    }
    if let Some(focus) = interests.specific_focus.as_deref().filter(|f| !f.trim().is_empty()) {
        lines.push(format!("Focus: {focus}"));
    }
    if lines.is_empty() { "No specific interests".to_owned() } else { lines.join("\n") }
}

/// Asks the model whether `tweet` relates to the personality's interests.
///
/// # Errors
/// Any client error.
pub async fn check_relevance(
    client: &LlmClient,
    personality: &Personality,
    tweet: &str,
) -> Result<Relevance, LlmError> {
    let prompt = format!(
        "Given this tweet: \"{tweet}\"\n\n\
         You are an AI with the following interests:\n{interests}\n\n\
         Determine if this tweet is relevant to your interests. Consider:\n\
         1. What is the main topic of the tweet?\n\
         2. Does it relate to any of your interests?\n\
         3. How strongly does it align with your interests?\n\n\
         Respond with either YES or NO, followed by a brief explanation.",
        interests = describe_interests(personality),
    );
    let request = ChatRequest::new(
        client.model(),
        vec![Message::system(RELEVANCE_SYSTEM_PROMPT), Message::user(prompt)],
    )
    .temperature(0.7);
    let raw = client.chat_completion(&request).await?;
    let relevance = Relevance::parse(&raw);
    tracing::debug!(agent = %personality.name, relevant = relevance.relevant, "Relevance checked");
    Ok(relevance)
}
