use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::CollectorError;
use crate::types::{ApiPage, UserLookup};

const TWEET_FIELDS: &str =
    "id,text,author_id,created_at,public_metrics,referenced_tweets,in_reply_to_user_id,lang";
const USER_FIELDS: &str = "id,name,username,description,public_metrics";
const EXPANSIONS: &str = "author_id,referenced_tweets.id,referenced_tweets.id.author_id";

/// Rate-limit headers of a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub remaining: Option<u64>,
    /// Epoch seconds when the window resets
    pub reset: Option<i64>,
}

impl RateLimitInfo {
    fn from_headers(headers: &HeaderMap) -> Self {
        let parse = |name: &str| headers.get(name)?.to_str().ok()?.trim().parse().ok();
        Self {
            remaining: parse("x-rate-limit-remaining"),
            reset: parse("x-rate-limit-reset").and_then(|v: u64| i64::try_from(v).ok()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub rate: RateLimitInfo,
}

/// Bearer-token client for the Twitter API v2. Each call is exactly one HTTP request.
pub struct TwitterClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("bearer_token", &"***")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(bearer_token: String, base_url: &str) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CollectorError::ClientInit(e.to_string()))?;
        Ok(Self { client, bearer_token, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    /// `GET /tweets/search/recent`
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn search_recent(
        &self,
        query: &str,
        max_results: u32,
        next_token: Option<&str>,
    ) -> Result<ApiResponse<ApiPage>, CollectorError> {
        let mut params = vec![
            ("query", query.to_owned()),
            ("max_results", max_results.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_owned()),
            ("user.fields", USER_FIELDS.to_owned()),
            ("expansions", EXPANSIONS.to_owned()),
        ];
        if let Some(token) = next_token {
            params.push(("next_token", token.to_owned()));
        }
        self.get_json("/tweets/search/recent", &params).await
    }

    /// `GET /users/by/username/:username`
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<ApiResponse<UserLookup>, CollectorError> {
        self.get_json(&format!("/users/by/username/{username}"), &[]).await
    }

    /// `GET /users/:id/tweets`, excluding retweets and replies.
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn get_users_tweets(
        &self,
        user_id: &str,
        max_results: u32,
        pagination_token: Option<&str>,
    ) -> Result<ApiResponse<ApiPage>, CollectorError> {
        let mut params = vec![
            ("exclude", "retweets,replies".to_owned()),
            ("max_results", max_results.to_string()),
            ("tweet.fields", TWEET_FIELDS.to_owned()),
            ("user.fields", USER_FIELDS.to_owned()),
            ("expansions", EXPANSIONS.to_owned()),
        ];
        if let Some(token) = pagination_token {
            params.push(("pagination_token", token.to_owned()));
        }
        self.get_json(&format!("/users/{user_id}/tweets"), &params).await
    }

    /// Issue one authenticated GET and decode the JSON body.
    ///
    /// # Errors
    /// `RateLimited` on HTTP 429, `HttpStatus` on other failures, `JsonParse` on a bad body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<ApiResponse<T>, CollectorError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(&self.bearer_token)
            .query(params)
            .send()
            .await?;

        let rate = RateLimitInfo::from_headers(response.headers());
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CollectorError::RateLimited { reset: rate.reset });
        }
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            return Err(CollectorError::HttpStatus { code: status.as_u16(), body });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str(&body).map_err(|source| CollectorError::JsonParse {
            context: format!("response from {path}"),
            source,
        })?;
        Ok(ApiResponse { body: parsed, rate })
    }
}
