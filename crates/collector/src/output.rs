//! Collection output file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collector::CollectionMode;
use crate::error::CollectorError;
use crate::types::{ApiTweet, ApiUser};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    pub collection_type: CollectionMode,
}

/// Everything gathered for one topic query or one author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub tweets: Vec<ApiTweet>,
    /// Users keyed by id
    pub users: BTreeMap<String, ApiUser>,
    /// Quoted or replied-to tweets keyed by id
    pub referenced_tweets: BTreeMap<String, ApiTweet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub timestamp: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDataset {
    pub metadata: CollectionMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_results: Option<BTreeMap<String, QueryResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_results: Option<BTreeMap<String, QueryResult>>,
}

impl CollectionDataset {
    fn results(&self) -> impl Iterator<Item = &QueryResult> {
        self.topic_results.iter().chain(self.author_results.iter()).flat_map(BTreeMap::values)
    }

    /// Tweets across every query.
    #[must_use]
    pub fn total_tweets(&self) -> usize {
        self.results().map(|r| r.tweets.len()).sum()
    }

    /// Queries that recorded an error.
    #[must_use]
    pub fn failed_queries(&self) -> usize {
        self.results().filter(|r| r.error.is_some()).count()
    }
}

/// `<collection_type>_data_<YYYYmmdd_HHMMSS>.json`
#[must_use]
pub fn default_file_name(mode: CollectionMode, now: DateTime<Utc>) -> String {
    format!("{}_data_{}.json", mode.as_str(), now.format("%Y%m%d_%H%M%S"))
}

/// Pretty-prints the dataset into `output_dir`, creating the directory if needed.
///
/// # Errors
/// Returns `CollectorError::Io` or `CollectorError::Serialize`.
pub fn save_to_file(
    dataset: &CollectionDataset,
    output_dir: &Path,
    file_name: Option<&str>,
) -> Result<PathBuf, CollectorError> {
    std::fs::create_dir_all(output_dir)
        .map_err(|source| CollectorError::Io { path: output_dir.to_path_buf(), source })?;
    let name = file_name.map_or_else(
        || default_file_name(dataset.metadata.collection_type, Utc::now()),
        ToOwned::to_owned,
    );
    let path = output_dir.join(name);
    let json = serde_json::to_string_pretty(dataset).map_err(CollectorError::Serialize)?;
    std::fs::write(&path, json)
        .map_err(|source| CollectorError::Io { path: path.clone(), source })?;
    tracing::info!(path = %path.display(), tweets = dataset.total_tweets(), "Saved collection");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn test_default_file_name() {
        let now = Utc.with_ymd_and_hms(2025, 3, 12, 16, 43, 18).single().unwrap_or_default();
        assert_eq!(default_file_name(CollectionMode::Topics, now), "topics_data_20250312_164318.json");
        assert_eq!(default_file_name(CollectionMode::Authors, now), "authors_data_20250312_164318.json");
    }
}
