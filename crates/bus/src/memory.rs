use async_trait::async_trait;
use futures_util::stream;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::BusError;
use crate::{MessageStream, TweetPublisher, TweetSource};

const DEFAULT_CAPACITY: usize = 1024;

/// In-process bus backed by a tokio broadcast channel.
///
/// Like Redis pub/sub, messages published while nobody is subscribed are lost.
#[derive(Debug, Clone)]
pub struct MemoryBus {
    tx: broadcast::Sender<String>,
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TweetPublisher for MemoryBus {
    async fn publish_raw(&self, payload: String) -> Result<usize, BusError> {
        Ok(self.tx.send(payload).unwrap_or(0))
    }
}

#[async_trait]
impl TweetSource for MemoryBus {
    async fn subscribe(&self) -> Result<MessageStream, BusError> {
        let rx = self.tx.subscribe();
        let stream = stream::unfold(rx, |mut rx| async move {
            match rx.recv().await {
                Ok(payload) => Some((Ok(payload), rx)),
                Err(RecvError::Lagged(n)) => Some((Err(BusError::Lagged(n)), rx)),
                Err(RecvError::Closed) => None,
            }
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use futures_util::StreamExt as _;
    use tweetvec_core::{decode_tweet, TweetMessage};

    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_reaches_nobody() {
        let bus = MemoryBus::new();
        assert_eq!(bus.publish_raw("lost".to_owned()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = MemoryBus::new();
        let mut a = bus.subscribe().await.unwrap();
        let mut b = bus.subscribe().await.unwrap();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(&TweetMessage::new("u", "one")).await.unwrap(), 2);
        assert_eq!(bus.publish(&TweetMessage::new("u", "two")).await.unwrap(), 2);

        for stream in [&mut a, &mut b] {
            let first = decode_tweet(&stream.next().await.unwrap().unwrap()).unwrap();
            let second = decode_tweet(&stream.next().await.unwrap().unwrap()).unwrap();
            assert_eq!((first.content.as_str(), second.content.as_str()), ("one", "two"));
        }
    }

    #[tokio::test]
    async fn test_slow_subscriber_sees_lag() {
        let bus = MemoryBus::with_capacity(2);
        let mut sub = bus.subscribe().await.unwrap();
        for i in 0..5 {
            bus.publish_raw(format!("m{i}")).await.unwrap();
        }
        let err = sub.next().await.unwrap().unwrap_err();
        assert!(matches!(err, BusError::Lagged(3)));
        assert!(err.is_recoverable());
        assert_eq!(sub.next().await.unwrap().unwrap(), "m3");
    }

    #[tokio::test]
    async fn test_stream_ends_when_bus_dropped() {
        let bus = MemoryBus::new();
        let mut sub = bus.subscribe().await.unwrap();
        drop(bus);
        assert!(sub.next().await.is_none());
    }
}
