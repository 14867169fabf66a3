use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone as _, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use unicode_normalization::UnicodeNormalization as _;

use crate::constants::DEFAULT_LANG;
use crate::error::InvalidTweet;

/// Engagement counters attached to a tweet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngagementMetrics {
    pub retweets: u64,
    pub likes: u64,
    pub replies: u64,
    pub quotes: u64,
    pub bookmarks: u64,
    pub impressions: u64,
}

/// A validated tweet record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tweet {
    /// Source tweet id, or a generated UUID when the source had none
    pub tweet_id: String,
    /// Author handle
    pub author: String,
    /// Author id from the source API, the handle when unknown
    pub author_id: String,
    /// Tweet text (NFC-normalized, trimmed)
    pub content: String,
    #[serde(default)]
    pub metrics: EngagementMetrics,
    pub created_at: DateTime<Utc>,
    pub lang: String,
}

impl Tweet {
    /// Creates a fresh tweet with a generated id and the current time.
    #[must_use]
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        let author = author.into();
        Self {
            tweet_id: uuid::Uuid::new_v4().to_string(),
            author_id: author.clone(),
            author,
            content: content.into(),
            metrics: EngagementMetrics::default(),
            created_at: Utc::now(),
            lang: DEFAULT_LANG.to_owned(),
        }
    }

    /// Builds the bus payload carrying every field of this tweet.
    #[must_use]
    pub fn to_message(&self) -> TweetMessage {
        TweetMessage {
            author: self.author.clone(),
            content: self.content.clone(),
            tweet_id: Some(self.tweet_id.clone()),
            author_id: Some(self.author_id.clone()),
            retweet_count: Some(self.metrics.retweets),
            like_count: Some(self.metrics.likes),
            reply_count: Some(self.metrics.replies),
            quote_count: Some(self.metrics.quotes),
            bookmark_count: Some(self.metrics.bookmarks),
            impression_count: Some(self.metrics.impressions),
            created_at: Some(format_timestamp(&self.created_at)),
            lang: Some(self.lang.clone()),
        }
    }

    /// Whether the text is a classic `RT @user` retweet.
    #[must_use]
    pub fn is_retweet(&self) -> bool {
        self.content.starts_with("RT @")
    }
}

/// Canonical timestamp encoding used on the bus and in storage.
///
/// Fixed-width UTC so that lexicographic order matches chronological order.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Tweet payload published on the bus.
///
/// Only `author` and `content` are required by consumers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TweetMessage {
    pub author: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retweet_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impression_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl TweetMessage {
    /// Minimal message with only author and content.
    #[must_use]
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            tweet_id: None,
            author_id: None,
            retweet_count: None,
            like_count: None,
            reply_count: None,
            quote_count: None,
            bookmark_count: None,
            impression_count: None,
            created_at: None,
            lang: None,
        }
    }

    /// Serializes the message as a JSON string for publishing.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Engagement counters as nested by the social-media API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicMetrics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub retweet_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reply_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub quote_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub bookmark_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub impression_count: Option<u64>,
}

/// Tolerant decoder for every tweet shape seen on the bus and in datasets.
///
/// Accepts `author`/`content` messages, legacy `username`/`text` messages and raw API
/// tweets with nested `public_metrics`. Legacy names are separate fields so a record may
/// carry both spellings; the current name wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTweet {
    #[serde(default)]
    pub tweet_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub author_id: Option<Value>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub retweet_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub retweets: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reply_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub quote_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub bookmark_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub impression_count: Option<u64>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub lang: Option<String>,
}

impl RawTweet {
    /// Parses a bus payload. The payload must be a JSON object.
    ///
    /// # Errors
    /// Returns `InvalidTweet` if the payload is not valid JSON or not an object.
    pub fn from_json(payload: &str) -> Result<Self, InvalidTweet> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(value)
    }

    /// Converts an already-parsed JSON value.
    ///
    /// # Errors
    /// Returns `InvalidTweet` if the value is not an object or a field has the wrong type.
    pub fn from_value(value: Value) -> Result<Self, InvalidTweet> {
        if !value.is_object() {
            return Err(InvalidTweet::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Author id as a string, whether the source encoded it as a string or a number.
    #[must_use]
    pub fn author_id_str(&self) -> Option<String> {
        self.author_id.as_ref().and_then(id_to_string)
    }

    /// Whether this record names its author directly (not only through an id).
    #[must_use]
    pub fn has_author_name(&self) -> bool {
        non_empty(self.author.as_deref()).is_some() || non_empty(self.username.as_deref()).is_some()
    }

    /// Validates and normalizes the record.
    ///
    /// `now` is used when the record carries no parseable creation time.
    ///
    /// # Errors
    /// Returns `InvalidTweet::MissingField` when author or content is absent or blank.
    pub fn into_tweet(self, now: DateTime<Utc>) -> Result<Tweet, InvalidTweet> {
        let author_id = self.author_id_str();
        let author = non_empty(self.author.as_deref())
            .or_else(|| non_empty(self.username.as_deref()))
            .or_else(|| author_id.clone())
            .ok_or(InvalidTweet::MissingField("author"))?;
        let content = non_empty(self.content.as_deref())
            .or_else(|| non_empty(self.text.as_deref()))
            .ok_or(InvalidTweet::MissingField("content"))?;
        let content: String = content.nfc().collect();

        let nested = self.public_metrics.unwrap_or_default();
        let metrics = EngagementMetrics {
            retweets: self.retweet_count.or(self.retweets).or(nested.retweet_count).unwrap_or(0),
            likes: self.like_count.or(self.likes).or(nested.like_count).unwrap_or(0),
            replies: self.reply_count.or(nested.reply_count).unwrap_or(0),
            quotes: self.quote_count.or(nested.quote_count).unwrap_or(0),
            bookmarks: self.bookmark_count.or(nested.bookmark_count).unwrap_or(0),
            impressions: self.impression_count.or(nested.impression_count).unwrap_or(0),
        };

        let created_at = self
            .created_at
            .as_ref()
            .or(self.timestamp.as_ref())
            .and_then(parse_timestamp)
            .unwrap_or(now);

        Ok(Tweet {
            tweet_id: self
                .tweet_id
                .as_ref()
                .and_then(id_to_string)
                .or_else(|| self.id.as_ref().and_then(id_to_string))
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            author_id: author_id.unwrap_or_else(|| author.clone()),
            author,
            content,
            metrics,
            created_at,
            lang: non_empty(self.lang.as_deref()).unwrap_or_else(|| DEFAULT_LANG.to_owned()),
        })
    }
}

/// Decodes and validates one bus payload.
///
/// # Errors
/// Returns `InvalidTweet` for malformed JSON or missing author/content.
pub fn decode_tweet(payload: &str) -> Result<Tweet, InvalidTweet> {
    RawTweet::from_json(payload)?.into_tweet(Utc::now())
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(ToOwned::to_owned)
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses RFC 3339, naive ISO 8601 (taken as UTC) or epoch seconds.
#[must_use]
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(epoch_to_datetime),
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                        .ok()
                        .map(|n| n.and_utc())
                })
                .or_else(|| s.parse::<f64>().ok().and_then(epoch_to_datetime))
        },
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, reason = "epoch millis fit in i64")]
fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt((secs * 1000.0).round() as i64).single()
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "float counts are checked non-negative before truncation"
)]
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid count: {n}"))),
        Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("invalid count: {other}"))),
    }
}

/// Tweet plus its embedding, as written to the vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedTweet {
    pub tweet: Tweet,
    pub vector: Vec<f32>,
}

impl EmbeddedTweet {
    #[must_use]
    pub const fn new(tweet: Tweet, vector: Vec<f32>) -> Self {
        Self { tweet, vector }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

#[cfg(test)]
#[path = "tweet_tests.rs"]
mod tests;
