use std::sync::Arc;

use serde::Serialize;
use tweetvec_core::strip_code_fence;

use crate::ai_types::{ChatRequest, CringeJson, Message};
use crate::client::{truncate, LlmClient};
use crate::error::LlmError;

const SYSTEM_PROMPT: &str = "You rate tweets. Respond with a JSON object of the form \
    {\"score\": <number between 0 and 1>, \"reason\": \"<one sentence>\"}.";

/// A model's judgement of one tweet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CringeLevel {
    /// Always within `[0, 1]`
    pub score: f32,
    pub reason: String,
}

/// Scores tweets and compares the score against a fixed threshold.
#[derive(Debug, Clone)]
pub struct CringeDetector {
    client: Arc<LlmClient>,
    threshold: f32,
}

impl CringeDetector {
    #[must_use]
    pub const fn new(client: Arc<LlmClient>, threshold: f32) -> Self {
        Self { client, threshold }
    }

    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Strictly greater than the threshold; a score equal to it is not cringe.
    #[must_use]
    pub fn is_cringe(&self, level: &CringeLevel) -> bool {
        level.score > self.threshold
    }

    /// Asks the model for a `{score, reason}` verdict on `tweet`.
    ///
    /// # Errors
    /// Any client error, or `JsonParse` when the reply is not the expected object.
    pub async fn analyze(&self, tweet: &str) -> Result<CringeLevel, LlmError> {
        let prompt = format!(
            "Rate this tweet on level of cringeness, from 0 to 1 and provide a concise reason as to why:\n\n{tweet}"
        );
        let request = ChatRequest::new(
            self.client.model(),
            vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
        )
        .json()
        .temperature(0.7);

        let content = self.client.chat_completion(&request).await?;
        parse_level(&content)
    }
}

fn parse_level(content: &str) -> Result<CringeLevel, LlmError> {
    let json_str = strip_code_fence(content);
    let parsed: CringeJson = serde_json::from_str(json_str).map_err(|e| LlmError::JsonParse {
        context: format!("cringe verdict (response: {})", truncate(json_str, 300)),
        source: e,
    })?;
    if !parsed.score.is_finite() {
        return Err(LlmError::InvalidOutput(format!("non-finite score {}", parsed.score)));
    }
    Ok(CringeLevel { score: parsed.score.clamp(0.0, 1.0), reason: parsed.reason })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        }))
    }

    fn detector(server: &MockServer, threshold: f32) -> CringeDetector {
        let client = LlmClient::new("k".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();
        CringeDetector::new(Arc::new(client), threshold)
    }

    #[test]
    fn test_parse_level_clamps_score() {
        let high = parse_level(r#"{"score": 1.8, "reason": "very"}"#).unwrap();
        assert!((high.score - 1.0).abs() < f32::EPSILON);
        let low = parse_level(r#"{"score": -0.2}"#).unwrap();
        assert!(low.score.abs() < f32::EPSILON);
        assert!(low.reason.is_empty());
    }

    #[test]
    fn test_parse_level_accepts_fenced_json() {
        let level = parse_level("```json\n{\"score\": 0.4, \"reason\": \"mild\"}\n```").unwrap();
        assert!((level.score - 0.4).abs() < f32::EPSILON);
        assert_eq!(level.reason, "mild");
    }

    #[test]
    fn test_parse_level_rejects_prose() {
        assert!(matches!(parse_level("pretty cringe"), Err(LlmError::JsonParse { .. })));
    }

    #[tokio::test]
    async fn test_analyze_requests_json_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "test-model",
                "response_format": {"type": "json_object"}
            })))
            .respond_with(reply(r#"{"score": 0.9, "reason": "hustle culture"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let detector = detector(&server, 0.7);
        let level = detector.analyze("Rise and grind at 4am").await.unwrap();
        assert_eq!(level.reason, "hustle culture");
        assert!(detector.is_cringe(&level));
    }

    #[tokio::test]
    async fn test_threshold_is_strict() {
        let server = MockServer::start().await;
        let detector = detector(&server, 0.5);
        let at = CringeLevel { score: 0.5, reason: String::new() };
        let above = CringeLevel { score: 0.51, reason: String::new() };
        assert!(!detector.is_cringe(&at));
        assert!(detector.is_cringe(&above));
    }
}
