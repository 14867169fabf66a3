//! Twitter API v2 data collection
//!
//! Queries recent-search (topic mode) or user timelines (author mode), paginates within a
//! request budget, paces requests and backs off on rate limits, then writes the results as a
//! JSON dataset the seed loader understands.

mod client;
mod collector;
mod error;
mod output;
mod rate_limit;
mod types;

pub use client::{ApiResponse, RateLimitInfo, TwitterClient};
pub use collector::{normalize_handle, CollectionMode, Collector, DEFAULT_AUTHORS, DEFAULT_TOPICS};
pub use error::CollectorError;
pub use output::{default_file_name, save_to_file, CollectionDataset, CollectionMetadata, QueryResult};
pub use rate_limit::{RateLimitPolicy, RequestBudget};
pub use types::{ApiMeta, ApiPage, ApiTweet, ApiUser, Includes, UserLookup};
