use async_trait::async_trait;
use futures_util::StreamExt as _;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands as _;
use tweetvec_core::BusConfig;

use crate::error::BusError;
use crate::{MessageStream, TweetPublisher, TweetSource};

/// Redis pub/sub on a single channel.
#[derive(Clone)]
pub struct RedisBus {
    client: redis::Client,
    conn: MultiplexedConnection,
    channel: String,
}

impl std::fmt::Debug for RedisBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBus").field("channel", &self.channel).finish_non_exhaustive()
    }
}

impl RedisBus {
    /// Connects and pings the broker so an unreachable bus fails at startup.
    ///
    /// # Errors
    /// Returns `BusError::Redis` if the URL is invalid or the broker doesn't answer.
    pub async fn connect(config: &BusConfig) -> Result<Self, BusError> {
        let url = config.url();
        let client = redis::Client::open(url.as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        tracing::info!(addr = %config.addr, channel = %config.channel, reply = %pong, "Connected to message bus");
        Ok(Self { client, conn, channel: config.channel.clone() })
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl TweetPublisher for RedisBus {
    async fn publish_raw(&self, payload: String) -> Result<usize, BusError> {
        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(&self.channel, payload).await?;
        Ok(usize::try_from(receivers).unwrap_or(0))
    }
}

#[async_trait]
impl TweetSource for RedisBus {
    async fn subscribe(&self) -> Result<MessageStream, BusError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;
        tracing::info!(channel = %self.channel, "Subscribed");
        let stream = pubsub.into_on_message().map(|msg| {
            msg.get_payload::<String>().map_err(|e| BusError::InvalidPayload(e.to_string()))
        });
        Ok(Box::pin(stream))
    }
}
