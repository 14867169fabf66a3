use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Subscriber fell behind and the broadcast buffer dropped messages.
    #[error("subscriber lagged, {0} messages dropped")]
    Lagged(u64),

    /// A delivered message whose payload isn't a UTF-8 string.
    #[error("unreadable payload: {0}")]
    InvalidPayload(String),

    #[error("bus closed")]
    Closed,
}

impl BusError {
    /// Whether the subscription can keep going after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Lagged(_) | Self::InvalidPayload(_))
    }
}
