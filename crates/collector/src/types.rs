//! Twitter API v2 response shapes.
//!
//! Tweets and users keep every field the API returned (`extra`) so the saved dataset is a
//! faithful copy of the response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTweet {
    pub id: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiTweet {
    #[must_use]
    pub fn is_retweet(&self) -> bool {
        self.text.starts_with("RT @")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<ApiUser>,
    #[serde(default)]
    pub tweets: Vec<ApiTweet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMeta {
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One page of a search or timeline response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default)]
    pub data: Vec<ApiTweet>,
    #[serde(default)]
    pub includes: Includes,
    #[serde(default)]
    pub meta: ApiMeta,
}

/// `GET /users/by/username/:username`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLookup {
    #[serde(default)]
    pub data: Option<ApiUser>,
    #[serde(default)]
    pub errors: Vec<Value>,
}
