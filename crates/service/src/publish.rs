use std::time::Duration;

use rand::Rng;
use tweetvec_bus::TweetPublisher;
use tweetvec_core::{Tweet, TweetMessage};

use crate::error::ServiceError;

const PROGRESS_EVERY: usize = 100;

/// Publishes one test tweet; a missing author or text is generated.
///
/// Returns the message sent and the number of subscribers that received it.
pub async fn publish_test_tweet(
    publisher: &dyn TweetPublisher,
    author: Option<&str>,
    content: Option<&str>,
) -> Result<(TweetMessage, usize), ServiceError> {
    let message = {
        let mut rng = rand::thread_rng();
        let author = author.map_or_else(|| format!("user_{}", rng.gen_range(1000..=9999)), ToOwned::to_owned);
        let content = content.map_or_else(
            || format!("This is a test tweet published at {} #testing #embedding", uuid::Uuid::new_v4()),
            ToOwned::to_owned,
        );
        let mut message = Tweet::new(author, content).to_message();
        message.retweet_count = Some(rng.gen_range(0..=1000));
        message.like_count = Some(rng.gen_range(0..=5000));
        message
    };
    let receivers = publisher.publish(&message).await?;
    tracing::info!(author = %message.author, receivers, "Published test tweet");
    Ok((message, receivers))
}

/// Replays tweets onto the bus at a fixed pace.
#[derive(Debug, Clone, Copy)]
pub struct Replayer {
    pace: Duration,
    max_tweets: Option<usize>,
}

impl Default for Replayer {
    fn default() -> Self {
        Self { pace: Duration::from_millis(100), max_tweets: None }
    }
}

impl Replayer {
    #[must_use]
    pub const fn new(pace: Duration, max_tweets: Option<usize>) -> Self {
        Self { pace, max_tweets }
    }

    /// Publishes each tweet, waiting `pace` between messages. Returns how many were sent.
    pub async fn replay(&self, publisher: &dyn TweetPublisher, tweets: &[Tweet]) -> Result<usize, ServiceError> {
        let total = self.max_tweets.map_or(tweets.len(), |max| max.min(tweets.len()));
        tracing::info!(total, pace_ms = self.pace.as_millis(), "Replaying tweets");

        for (i, tweet) in tweets.iter().take(total).enumerate() {
            if i > 0 && !self.pace.is_zero() {
                tokio::time::sleep(self.pace).await;
            }
            publisher.publish(&tweet.to_message()).await?;
            let sent = i.saturating_add(1);
            if sent % PROGRESS_EVERY == 0 {
                tracing::info!(sent, total, "Replay progress");
            }
        }
        tracing::info!(sent = total, "Replay complete");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "test code")]

    use futures_util::StreamExt as _;
    use tweetvec_bus::{MemoryBus, TweetSource};
    use tweetvec_core::decode_tweet;

    use super::*;

    #[tokio::test]
    async fn test_test_tweet_generates_missing_fields() {
        let bus = MemoryBus::new();
        let mut stream = bus.subscribe().await.unwrap();
        let (message, receivers) = publish_test_tweet(&bus, None, None).await.unwrap();
        assert_eq!(receivers, 1);
        assert!(message.author.starts_with("user_"));
        assert_eq!(message.author.len(), "user_1234".len());
        assert!(message.content.contains("#testing"));

        let received = decode_tweet(&stream.next().await.unwrap().unwrap()).unwrap();
        assert_eq!(received.author, message.author);
    }

    #[tokio::test]
    async fn test_test_tweet_keeps_given_fields() {
        let bus = MemoryBus::new();
        let (message, receivers) = publish_test_tweet(&bus, Some("ada"), Some("hi")).await.unwrap();
        assert_eq!(receivers, 0);
        assert_eq!(message.author, "ada");
        assert_eq!(message.content, "hi");
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_paces_and_caps() {
        let bus = MemoryBus::new();
        let mut stream = bus.subscribe().await.unwrap();
        let tweets: Vec<Tweet> = (0..5).map(|i| Tweet::new("a", format!("tweet {i}"))).collect();

        let start = tokio::time::Instant::now();
        let sent = Replayer::new(Duration::from_secs(1), Some(3)).replay(&bus, &tweets).await.unwrap();
        assert_eq!(sent, 3);
        assert!(start.elapsed() >= Duration::from_secs(2));

        for i in 0..3 {
            let tweet = decode_tweet(&stream.next().await.unwrap().unwrap()).unwrap();
            assert_eq!(tweet.content, format!("tweet {i}"));
            assert_eq!(tweet.tweet_id, tweets[i].tweet_id);
        }
    }
}
