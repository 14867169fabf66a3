//! Service layer for tweetvec
//!
//! Wires the bus, embedding model, vector store and LLM together: the ingest subscriber, seed
//! loader, replay and test publishers, archive writer, search, agents and simulations.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Services hold trait objects")]

mod activity;
mod agents;
mod archive;
mod error;
mod ingest;
mod profile_set;
mod publish;
mod search;
mod seed;
mod simulation;
mod subscriber;

#[cfg(test)]
mod test_support;

pub use activity::{ActivityLog, EntryKind};
pub use agents::{
    AgentDeps, AgentOrchestrator, AgentRunner, CringeJudge, Reaction, RelevanceFilter, ReplyWriter,
};
pub use archive::{ArchiveRecord, ArchiveWriter};
pub use error::ServiceError;
pub use ingest::IngestService;
pub use profile_set::ProfileSet;
pub use publish::{publish_test_tweet, Replayer};
pub use search::{SearchQuery, SearchResult, SearchService};
pub use seed::{SeedLoader, SeedReport};
pub use simulation::Simulation;
pub use subscriber::{run_subscriber, LoopStats, MessageHandler};
