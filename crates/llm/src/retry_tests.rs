#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use crate::ai_types::{ChatRequest, Message};
    use crate::client::LlmClient;
    use crate::error::LlmError;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_server() -> MockServer {
        MockServer::start().await
    }

    fn create_test_request() -> ChatRequest {
        ChatRequest::new("test-model", vec![Message::user("hello")])
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let server = setup_mock_server().await;
        let client = LlmClient::new("test-key".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "test response",
                        "role": "assistant"
                    }
                }]
            })))
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await.unwrap();
        assert_eq!(result, "test response");
    }

    #[tokio::test]
    async fn test_retry_on_429_then_success() {
        let server = setup_mock_server().await;
        let client = LlmClient::new("test-key".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "success after retry",
                        "role": "assistant"
                    }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await.unwrap();
        assert_eq!(result, "success after retry");
    }

    #[tokio::test]
    async fn test_retry_on_503_then_success() {
        let server = setup_mock_server().await;
        let client = LlmClient::new("test-key".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "success after 503",
                        "role": "assistant"
                    }
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await.unwrap();
        assert_eq!(result, "success after 503");
    }

    #[tokio::test]
    async fn test_no_retry_on_401() {
        let server = setup_mock_server().await;
        let client = LlmClient::new("test-key".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await;
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("401"));
        assert!(err_msg.contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_all_retries_exhausted() {
        let server = setup_mock_server().await;
        let client = LlmClient::new("test-key".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();
        let request = create_test_request();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .expect(4)
            .mount(&server)
            .await;

        let result = client.chat_completion(&request).await;
        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("503"));
        assert!(err_msg.contains("Service Unavailable"));
    }

    #[tokio::test]
    async fn test_missing_content_is_empty_response() {
        let server = setup_mock_server().await;
        let client = LlmClient::new("test-key".to_owned(), &server.uri(), "test-model".to_owned()).unwrap();

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.chat_completion(&create_test_request()).await;
        assert!(matches!(result, Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_debug_masks_api_key() {
        let client = LlmClient::new("sk-secret".to_owned(), "http://localhost/", "m".to_owned()).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert_eq!(client.base_url(), "http://localhost");
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = tweetvec_core::LlmConfig::default();
        assert!(matches!(LlmClient::from_config(&config), Err(LlmError::ClientInit(_))));
    }
}
