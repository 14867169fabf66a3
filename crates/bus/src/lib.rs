//! Pub/sub transport for tweet messages
//!
//! [`RedisBus`] talks to a real broker; [`MemoryBus`] is an in-process broadcast channel with
//! the same semantics, used by tests and single-process simulations.

mod error;
mod memory;
mod redis_bus;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use tweetvec_core::TweetMessage;

pub use error::BusError;
pub use memory::MemoryBus;
pub use redis_bus::RedisBus;

/// Raw payloads in delivery order. Ends when the subscription is closed.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<String, BusError>> + Send>>;

#[async_trait]
pub trait TweetPublisher: Send + Sync {
    /// Publishes a raw payload; returns how many subscribers received it.
    async fn publish_raw(&self, payload: String) -> Result<usize, BusError>;

    /// Serializes and publishes a tweet message.
    async fn publish(&self, message: &TweetMessage) -> Result<usize, BusError> {
        let payload = message.to_json()?;
        self.publish_raw(payload).await
    }
}

#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Opens a new subscription to the tweet channel.
    async fn subscribe(&self) -> Result<MessageStream, BusError>;
}
