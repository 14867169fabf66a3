//! Dataset files: ordered tweet records persisted as JSON.
//!
//! Several layouts are in circulation: plain arrays, collector output keyed by topic or
//! author, raw API responses and `{"tweets": ...}` wrappers. All of them reduce to a list
//! of [`RawTweet`] records in file order.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::DatasetError;
use crate::tweet::{RawTweet, Tweet};

/// Records read from one dataset file.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Decodable records, in file order
    pub records: Vec<RawTweet>,
    /// Entries that were not JSON objects or had mistyped fields
    pub malformed: usize,
}

impl Dataset {
    /// Reads and parses a dataset file.
    ///
    /// # Errors
    /// Returns `DatasetError` if the file can't be read, isn't JSON, or has an unknown layout.
    pub fn read(path: &Path) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|source| DatasetError::Json { path: path.to_path_buf(), source })?;
        let dataset = Self::from_value(value)?;
        tracing::info!(
            path = %path.display(),
            records = dataset.records.len(),
            malformed = dataset.malformed,
            "Read dataset"
        );
        Ok(dataset)
    }

    /// Extracts records from an already-parsed document.
    ///
    /// # Errors
    /// Returns `DatasetError::UnrecognizedLayout` for documents matching no known layout.
    pub fn from_value(value: Value) -> Result<Self, DatasetError> {
        let mut dataset = Self::default();
        match value {
            Value::Array(items) => dataset.extend(items, &HashMap::new()),
            Value::Object(mut root) => {
                if let Some(results) = take_object(&mut root, "topic_results")
                    .or_else(|| take_object(&mut root, "author_results"))
                {
                    for (key, result) in results {
                        let Value::Object(mut result) = result else {
                            tracing::warn!(key, "Skipping non-object collection result");
                            continue;
                        };
                        let users = usernames_from_map(result.get("users"));
                        if let Some(Value::Array(tweets)) = result.remove("tweets") {
                            dataset.extend(tweets, &users);
                        }
                    }
                } else if let Some(Value::Array(data)) = root.remove("data") {
                    let users = root
                        .get("includes")
                        .and_then(|inc| inc.get("users"))
                        .map(usernames_from_list)
                        .unwrap_or_default();
                    dataset.extend(data, &users);
                } else if let Some(Value::Array(included)) = root
                    .get_mut("includes")
                    .and_then(|inc| inc.get_mut("tweets"))
                    .map(Value::take)
                {
                    dataset.extend(included, &HashMap::new());
                } else if let Some(tweets) = root.remove("tweets") {
                    match tweets {
                        Value::Array(items) => dataset.extend(items, &HashMap::new()),
                        Value::Object(by_id) => {
                            let items = by_id
                                .into_iter()
                                .map(|(id, mut tweet)| {
                                    if let Value::Object(fields) = &mut tweet {
                                        fields.entry("id").or_insert(Value::String(id));
                                    }
                                    tweet
                                })
                                .collect();
                            dataset.extend(items, &HashMap::new());
                        },
                        other => {
                            return Err(DatasetError::UnrecognizedLayout(format!(
                                "\"tweets\" is neither a list nor a map: {}",
                                type_name(&other)
                            )));
                        },
                    }
                } else {
                    let keys: Vec<&str> = root.keys().map(String::as_str).collect();
                    return Err(DatasetError::UnrecognizedLayout(format!(
                        "object with keys [{}]",
                        keys.join(", ")
                    )));
                }
            },
            other => {
                return Err(DatasetError::UnrecognizedLayout(type_name(&other).to_owned()));
            },
        }
        Ok(dataset)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validates every record, dropping (and logging) those without author or content.
    ///
    /// Returns the valid tweets and the number of records skipped.
    #[must_use]
    pub fn into_tweets(self, now: DateTime<Utc>) -> (Vec<Tweet>, usize) {
        let mut skipped = self.malformed;
        let tweets = self
            .records
            .into_iter()
            .enumerate()
            .filter_map(|(idx, raw)| match raw.into_tweet(now) {
                Ok(tweet) => Some(tweet),
                Err(e) => {
                    tracing::warn!(index = idx, error = %e, "Skipping invalid dataset record");
                    skipped = skipped.saturating_add(1);
                    None
                },
            })
            .collect();
        (tweets, skipped)
    }

    fn extend(&mut self, items: Vec<Value>, usernames: &HashMap<String, String>) {
        for item in items {
            match RawTweet::from_value(item) {
                Ok(mut raw) => {
                    if !raw.has_author_name() {
                        if let Some(name) = raw.author_id_str().and_then(|id| usernames.get(&id)) {
                            raw.username = Some(name.clone());
                        }
                    }
                    self.records.push(raw);
                },
                Err(e) => {
                    tracing::debug!(error = %e, "Malformed dataset entry");
                    self.malformed = self.malformed.saturating_add(1);
                },
            }
        }
    }
}

fn take_object(root: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match root.remove(key) {
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            root.insert(key.to_owned(), other);
            None
        },
        None => None,
    }
}

/// `{"<user id>": {"username": ...}}` as written by the collector.
fn usernames_from_map(users: Option<&Value>) -> HashMap<String, String> {
    users
        .and_then(Value::as_object)
        .map(|users| {
            users
                .iter()
                .filter_map(|(id, user)| {
                    let name = user.get("username")?.as_str()?;
                    Some((id.clone(), name.to_owned()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `[{"id": ..., "username": ...}]` as returned in API `includes.users`.
fn usernames_from_list(users: &Value) -> HashMap<String, String> {
    users
        .as_array()
        .map(|users| {
            users
                .iter()
                .filter_map(|user| {
                    let id = user.get("id")?.as_str()?;
                    let name = user.get("username")?.as_str()?;
                    Some((id.to_owned(), name.to_owned()))
                })
                .collect()
        })
        .unwrap_or_default()
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn parses_plain_array() {
        let dataset = Dataset::from_value(json!([
            {"author": "a", "content": "one"},
            {"username": "b", "text": "two"}
        ]))
        .unwrap();
        assert_eq!(dataset.len(), 2);
        let (tweets, skipped) = dataset.into_tweets(now());
        assert_eq!(skipped, 0);
        assert_eq!(tweets[0].author, "a");
        assert_eq!(tweets[1].content, "two");
    }

    #[test]
    fn parses_topic_results_and_resolves_usernames() {
        let dataset = Dataset::from_value(json!({
            "metadata": {"collection_type": "topics"},
            "topic_results": {
                "rust": {
                    "tweets": [
                        {"id": "1", "text": "borrowck", "author_id": "10"},
                        {"id": "2", "text": "lifetimes", "author_id": "11"}
                    ],
                    "users": {"10": {"id": "10", "username": "ferris"}},
                    "count": 2
                }
            }
        }))
        .unwrap();
        let (tweets, skipped) = dataset.into_tweets(now());
        assert_eq!(skipped, 0);
        assert_eq!(tweets.len(), 2);
        assert_eq!(tweets[0].author, "ferris");
        assert_eq!(tweets[0].author_id, "10");
        assert_eq!(tweets[1].author, "11");
    }

    #[test]
    fn parses_author_results() {
        let dataset = Dataset::from_value(json!({
            "author_results": {
                "naval": {"tweets": [{"id": "5", "text": "wealth", "author_id": "99"}],
                          "users": {"99": {"username": "naval"}}},
                "missing": {"tweets": [], "error": "User @missing not found", "count": 0}
            }
        }))
        .unwrap();
        let (tweets, _) = dataset.into_tweets(now());
        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].author, "naval");
    }

    #[test]
    fn parses_api_response_with_includes_users() {
        let dataset = Dataset::from_value(json!({
            "data": [{"id": "1", "text": "hello", "author_id": "7"}],
            "includes": {"users": [{"id": "7", "username": "seven"}]}
        }))
        .unwrap();
        let (tweets, _) = dataset.into_tweets(now());
        assert_eq!(tweets[0].author, "seven");
    }

    #[test]
    fn parses_includes_tweets() {
        let dataset = Dataset::from_value(json!({
            "includes": {"tweets": [{"id": "1", "text": "quoted", "author_id": "3"}]}
        }))
        .unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn parses_tweets_map_and_fills_ids() {
        let dataset = Dataset::from_value(json!({
            "tweets": {"abc": {"author": "u", "content": "keyed"}}
        }))
        .unwrap();
        let (tweets, _) = dataset.into_tweets(now());
        assert_eq!(tweets[0].tweet_id, "abc");
    }

    #[test]
    fn counts_malformed_and_invalid_entries() {
        let dataset = Dataset::from_value(json!([
            {"author": "a", "content": "ok"},
            "just a string",
            {"author": "b"}
        ]))
        .unwrap();
        assert_eq!(dataset.malformed, 1);
        let (tweets, skipped) = dataset.into_tweets(now());
        assert_eq!(tweets.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn rejects_unknown_layout() {
        let err = Dataset::from_value(json!({"rows": []})).unwrap_err();
        assert!(matches!(err, DatasetError::UnrecognizedLayout(msg) if msg.contains("rows")));
        assert!(Dataset::from_value(json!("text")).is_err());
    }

    #[test]
    fn reads_dataset_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tweets.json");
        std::fs::write(&path, r#"[{"author":"u","content":"from disk"}]"#).unwrap();
        let dataset = Dataset::read(&path).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn read_reports_missing_file_and_bad_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(Dataset::read(&missing), Err(DatasetError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{oops").unwrap();
        assert!(matches!(Dataset::read(&bad), Err(DatasetError::Json { .. })));
    }
}
