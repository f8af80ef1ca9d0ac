use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrokerError>;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to connect to broker: {0}")]
    Connect(String),

    #[error("failed to publish to {subject}: {source}")]
    Publish {
        subject: String,
        source: async_nats::jetstream::context::PublishError,
    },

    #[error("failed to set up stream/consumer: {0}")]
    Topology(String),

    #[error("failed to pull next message: {0}")]
    Pull(String),

    #[error("malformed message payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("failed to ack/nack/reject message: {0}")]
    Disposition(String),
}
