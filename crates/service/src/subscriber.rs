use std::future::Future;

use async_trait::async_trait;
use futures_util::StreamExt as _;
use tweetvec_bus::TweetSource;

use crate::error::ServiceError;

/// Reacts to one raw bus payload.
#[async_trait]
pub trait MessageHandler: Send {
    async fn handle(&mut self, payload: &str) -> Result<(), ServiceError>;
}

/// Counters for one subscriber run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub received: usize,
    pub handled: usize,
    pub dropped: usize,
}

/// Feeds every message from a fresh subscription to `handler` until the stream ends or
/// `shutdown` resolves.
///
/// Messages are handled one at a time, in delivery order. Non-fatal errors drop the message;
/// the first fatal error ends the loop.
pub async fn run_subscriber<H, F>(
    source: &dyn TweetSource,
    handler: &mut H,
    shutdown: F,
) -> Result<LoopStats, ServiceError>
where
    H: MessageHandler + ?Sized,
    F: Future<Output = ()> + Send,
{
    let mut stream = source.subscribe().await?;
    tokio::pin!(shutdown);
    let mut stats = LoopStats::default();
    tracing::info!("Subscribed, waiting for messages");

    loop {
        tokio::select! {
            biased;
            next = stream.next() => match next {
                Some(Ok(payload)) => {
                    stats.received = stats.received.saturating_add(1);
                    match handler.handle(&payload).await {
                        Ok(()) => stats.handled = stats.handled.saturating_add(1),
                        Err(e) if !e.is_fatal() => {
                            stats.dropped = stats.dropped.saturating_add(1);
                            tracing::warn!(error = %e, "Dropping message");
                        },
                        Err(e) => {
                            tracing::error!(error = %e, "Fatal error, stopping subscriber");
                            return Err(e);
                        },
                    }
                },
                Some(Err(e)) if e.is_recoverable() => {
                    stats.dropped = stats.dropped.saturating_add(1);
                    tracing::warn!(error = %e, "Skipping undeliverable message");
                },
                Some(Err(e)) => return Err(e.into()),
                None => {
                    tracing::info!("Subscription closed");
                    break;
                },
            },
            () = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break;
            },
        }
    }
    Ok(stats)
}
