use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tweetvec_core::format_timestamp;

use crate::client::{ApiResponse, TwitterClient};
use crate::error::CollectorError;
use crate::output::{CollectionDataset, CollectionMetadata, QueryResult};
use crate::rate_limit::{Pacer, RateLimitPolicy, RequestBudget};
use crate::types::ApiPage;

pub const DEFAULT_TOPICS: &[&str] = &["pmf OR a16z OR \"y combinator\" OR \"product market fit\""];
pub const DEFAULT_AUTHORS: &[&str] = &["naval", "jason"];

/// Appended to every topic query.
const TOPIC_FILTER: &str = " -is:retweet lang:en";
const MIN_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[A-Za-z0-9_]{1,15}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionMode {
    Topics,
    Authors,
}

impl CollectionMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Topics => "topics",
            Self::Authors => "authors",
        }
    }
}

/// Validates a handle and strips a leading `@`.
///
/// # Errors
/// Returns `CollectorError::InvalidHandle` for anything that isn't 1-15 word characters.
pub fn normalize_handle(handle: &str) -> Result<String, CollectorError> {
    let trimmed = handle.trim();
    if !HANDLE_RE.is_match(trimmed) {
        return Err(CollectorError::InvalidHandle(handle.to_owned()));
    }
    Ok(trimmed.trim_start_matches('@').to_owned())
}

fn page_size(remaining: usize) -> u32 {
    u32::try_from(remaining.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)).unwrap_or(100)
}

/// Drives paginated collection within a request budget.
#[derive(Debug)]
pub struct Collector {
    client: TwitterClient,
    budget: RequestBudget,
    pacer: Pacer,
}

impl Collector {
    #[must_use]
    pub const fn new(client: TwitterClient, policy: RateLimitPolicy, max_requests: usize) -> Self {
        Self { client, budget: RequestBudget::new(max_requests), pacer: Pacer::new(policy) }
    }

    #[must_use]
    pub const fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    /// Collects up to `max_results` tweets for each topic.
    pub async fn collect_topics(&mut self, topics: &[String], max_results: usize) -> CollectionDataset {
        let mut results = BTreeMap::new();
        for (i, topic) in topics.iter().enumerate() {
            if self.budget.is_exhausted() {
                tracing::warn!(topic, "Request budget exhausted, skipping remaining topics");
                break;
            }
            if i > 0 {
                tokio::time::sleep(self.pacer.policy().query_gap).await;
            }
            tracing::info!(topic, "Collecting tweets for topic");
            let result = self.fetch_topic(topic, max_results).await;
            results.insert(topic.clone(), result);
        }
        CollectionDataset {
            metadata: CollectionMetadata {
                timestamp: format_timestamp(&Utc::now()),
                topics: Some(topics.to_vec()),
                authors: None,
                collection_type: CollectionMode::Topics,
            },
            topic_results: Some(results),
            author_results: None,
        }
    }

    /// Collects up to `max_results` recent tweets from each author.
    ///
    /// Each author costs at least two requests, so at most `max_requests / 2` are queried.
    pub async fn collect_authors(&mut self, authors: &[String], max_results: usize) -> CollectionDataset {
        let cap = self.budget.max() / 2;
        let authors = if authors.len() > cap {
            tracing::warn!(requested = authors.len(), cap, "Limiting authors to fit the request budget");
            authors.get(..cap).unwrap_or_default()
        } else {
            authors
        };

        let mut results = BTreeMap::new();
        for (i, author) in authors.iter().enumerate() {
            if self.budget.is_exhausted() {
                tracing::warn!(author, "Request budget exhausted, skipping remaining authors");
                break;
            }
            if i > 0 {
                tokio::time::sleep(self.pacer.policy().query_gap).await;
            }
            tracing::info!(author, "Collecting tweets from author");
            let result = self.fetch_author(author, max_results).await;
            results.insert(author.clone(), result);
        }
        CollectionDataset {
            metadata: CollectionMetadata {
                timestamp: format_timestamp(&Utc::now()),
                topics: None,
                authors: Some(authors.to_vec()),
                collection_type: CollectionMode::Authors,
            },
            topic_results: None,
            author_results: Some(results),
        }
    }

    async fn fetch_topic(&mut self, topic: &str, max_results: usize) -> QueryResult {
        let query = format!("{topic}{TOPIC_FILTER}");
        let mut result = QueryResult { query: Some(topic.to_owned()), ..QueryResult::default() };
        let mut next_token: Option<String> = None;

        while result.tweets.len() < max_results {
            let size = page_size(max_results - result.tweets.len());
            let page = self
                .call(|client| {
                    let query = query.clone();
                    let token = next_token.clone();
                    async move { client.search_recent(&query, size, token.as_deref()).await }
                })
                .await;
            match page {
                Ok(page) => {
                    next_token = absorb_page(&mut result, page, max_results, true);
                    if next_token.is_none() {
                        break;
                    }
                },
                Err(e) => {
                    tracing::error!(topic, error = %e, "Error searching for tweets");
                    result.error = Some(e.to_string());
                    break;
                },
            }
        }
        finish(result)
    }

    async fn fetch_author(&mut self, author: &str, max_results: usize) -> QueryResult {
        let mut result = QueryResult { username: Some(author.to_owned()), ..QueryResult::default() };

        let handle = match normalize_handle(author) {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(author, "Skipping invalid handle");
                result.error = Some(e.to_string());
                return finish(result);
            },
        };

        let lookup = self
            .call(|client| {
                let handle = handle.clone();
                async move { client.get_user_by_username(&handle).await }
            })
            .await;
        let user = match lookup {
            Ok(lookup) => match lookup.data {
                Some(user) => user,
                None => {
                    tracing::warn!(author = %handle, "User not found");
                    result.error = Some(format!("User @{handle} not found"));
                    return finish(result);
                },
            },
            Err(e) => {
                tracing::error!(author = %handle, error = %e, "Error getting user");
                result.error = Some(e.to_string());
                return finish(result);
            },
        };
        let user_id = user.id.clone();
        result.user_id = Some(user_id.clone());
        result.users.insert(user.id.clone(), user);

        let mut next_token: Option<String> = None;
        while result.tweets.len() < max_results {
            let size = page_size(max_results - result.tweets.len());
            let page = self
                .call(|client| {
                    let user_id = user_id.clone();
                    let token = next_token.clone();
                    async move { client.get_users_tweets(&user_id, size, token.as_deref()).await }
                })
                .await;
            match page {
                Ok(page) => {
                    next_token = absorb_page(&mut result, page, max_results, false);
                    if next_token.is_none() {
                        break;
                    }
                },
                Err(e) => {
                    tracing::error!(author = %handle, error = %e, "Error getting tweets");
                    result.error = Some(e.to_string());
                    break;
                },
            }
        }
        finish(result)
    }

    /// One logical API call: budget check, pacing, and up to `max_retries` retries on HTTP 429.
    async fn call<'a, T, F, Fut>(&'a mut self, make_request: F) -> Result<T, CollectorError>
    where
        F: Fn(&'a TwitterClient) -> Fut,
        Fut: std::future::Future<Output = Result<ApiResponse<T>, CollectorError>> + 'a,
    {
        let policy = *self.pacer.policy();
        let mut retry: u32 = 0;
        loop {
            if !self.budget.try_acquire() {
                return Err(CollectorError::BudgetExhausted(self.budget.max()));
            }
            self.pacer.wait().await;
            match make_request(&self.client).await {
                Ok(response) => {
                    self.pacer.observe(&response.rate, Utc::now().timestamp());
                    return Ok(response.body);
                },
                Err(e) if e.is_rate_limited() && retry < policy.max_retries => {
                    retry = retry.saturating_add(1);
                    let delay = policy.backoff(retry);
                    tracing::warn!(
                        attempt = retry,
                        max = policy.max_retries,
                        delay_secs = delay.as_secs(),
                        "Rate limit exceeded, retrying"
                    );
                    self.pacer.block_for(delay);
                },
                Err(e) => return Err(e),
            }
        }
    }
}

/// Moves a page into `result`; returns the next-page token if more is wanted.
fn absorb_page(
    result: &mut QueryResult,
    page: ApiPage,
    max_results: usize,
    drop_retweets: bool,
) -> Option<String> {
    for user in page.includes.users {
        result.users.insert(user.id.clone(), user);
    }
    for tweet in page.includes.tweets {
        result.referenced_tweets.insert(tweet.id.clone(), tweet);
    }
    let received = page.data.len();
    for tweet in page.data {
        if result.tweets.len() >= max_results {
            break;
        }
        if drop_retweets && tweet.is_retweet() {
            continue;
        }
        result.tweets.push(tweet);
    }
    if received == 0 {
        return None;
    }
    page.meta.next_token
}

fn finish(mut result: QueryResult) -> QueryResult {
    result.count = result.tweets.len();
    result.timestamp = format_timestamp(&Utc::now());
    result
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
