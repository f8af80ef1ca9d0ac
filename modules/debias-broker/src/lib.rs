//! Broker adapter (C6): durable, pull-based work queues over NATS JetStream.
//!
//! Subjects `fetch-queue`, `render-queue`, and `process-queue` all live on a single stream,
//! `debias`, configured with work-queue retention — a message is removed from the stream the
//! moment any consumer acks it, and at most one consumer sees a given message at a time
//! (competing consumers). Consumption is batch-size-1 pull, matching the one-in-flight-per-
//! consumer-thread flow control described in §5.

pub mod error;

pub use error::{BrokerError, Result};

use async_nats::jetstream::{self, consumer::pull::Config as PullConfig, stream::Config as StreamConfig, AckKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

pub const STREAM_NAME: &str = "debias";
pub const FETCH_QUEUE: &str = "fetch-queue";
pub const RENDER_QUEUE: &str = "render-queue";
pub const PROCESS_QUEUE: &str = "process-queue";

/// Terminal disposition for a consumed message (§4.5, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Consumed successfully; remove from the stream.
    Ack,
    /// Transient failure; redeliver after the consumer's backoff.
    Nack,
    /// Poison message; drop without redelivery.
    Reject,
}

/// A durable, pull-based connection to the `debias` work-queue stream.
#[derive(Clone)]
pub struct Broker {
    jetstream: jetstream::Context,
}

impl Broker {
    /// Connect to NATS and bind a JetStream context. Does not create the stream — call
    /// [`Broker::ensure_stream`] once at startup.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let client = async_nats::connect(dsn)
            .await
            .map_err(|e| BrokerError::Connect(e.to_string()))?;
        let jetstream = jetstream::new(client);
        Ok(Self { jetstream })
    }

    /// Idempotently create the `debias` stream with work-queue retention over the three
    /// subjects this pipeline uses.
    pub async fn ensure_stream(&self) -> Result<()> {
        self.jetstream
            .get_or_create_stream(StreamConfig {
                name: STREAM_NAME.to_string(),
                subjects: vec![
                    FETCH_QUEUE.to_string(),
                    RENDER_QUEUE.to_string(),
                    PROCESS_QUEUE.to_string(),
                ],
                retention: jetstream::stream::RetentionPolicy::WorkQueue,
                ..Default::default()
            })
            .await
            .map_err(|e| BrokerError::Topology(e.to_string()))?;
        info!(stream = STREAM_NAME, "stream ready");
        Ok(())
    }

    /// Fire-and-forget publish of a JSON-serializable payload to `subject`.
    pub async fn publish<T: Serialize>(&self, subject: &str, payload: &T) -> Result<()> {
        let bytes = serde_json::to_vec(payload)?;
        self.jetstream
            .publish(subject.to_string(), bytes.into())
            .await
            .map_err(|e| BrokerError::Publish {
                subject: subject.to_string(),
                source: e,
            })?
            .await
            .map_err(|e| BrokerError::Publish {
                subject: subject.to_string(),
                source: e,
            })?;
        debug!(subject, "published");
        Ok(())
    }

    /// Bind a durable, pull-based, batch-size-1 consumer to `subject`.
    pub async fn consumer(&self, subject: &str) -> Result<WorkQueueConsumer> {
        let stream = self
            .jetstream
            .get_stream(STREAM_NAME)
            .await
            .map_err(|e| BrokerError::Topology(e.to_string()))?;

        let durable_name = format!("{subject}-worker");
        let consumer = stream
            .get_or_create_consumer(
                &durable_name,
                PullConfig {
                    durable_name: Some(durable_name.clone()),
                    filter_subject: subject.to_string(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| BrokerError::Topology(e.to_string()))?;

        Ok(WorkQueueConsumer { consumer, subject: subject.to_string() })
    }
}

/// A single-subject, batch-size-1 pull consumer.
pub struct WorkQueueConsumer {
    consumer: jetstream::consumer::Consumer<PullConfig>,
    subject: String,
}

/// One delivered message, carrying its decoded payload and the handle needed to ack/nack/
/// reject it.
pub struct Delivery<T> {
    pub payload: T,
    message: jetstream::Message,
}

impl WorkQueueConsumer {
    /// Pull the next message (blocking until one is available), decoding its JSON payload as
    /// `T`. Returns `Ok(None)` if the pull yields no message before the consumer closes.
    pub async fn next<T: DeserializeOwned>(&self) -> Result<Option<Delivery<T>>> {
        use futures::StreamExt;

        let mut batch = self
            .consumer
            .fetch()
            .max_messages(1)
            .messages()
            .await
            .map_err(|e| BrokerError::Pull(e.to_string()))?;

        let Some(message) = batch.next().await else {
            return Ok(None);
        };
        let message = message.map_err(|e| BrokerError::Pull(e.to_string()))?;

        let payload: T = serde_json::from_slice(&message.payload)?;
        Ok(Some(Delivery { payload, message }))
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl<T> Delivery<T> {
    /// Consumed successfully; drop from the stream.
    pub async fn ack(self) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|e| BrokerError::Disposition(e.to_string()))
    }

    /// Transient failure; redeliver after the broker's backoff.
    pub async fn nack(self) -> Result<()> {
        self.message
            .ack_with(AckKind::Nak(None))
            .await
            .map_err(|e| BrokerError::Disposition(e.to_string()))
    }

    /// Poison message; terminate redelivery.
    pub async fn reject(self) -> Result<()> {
        self.message
            .ack_with(AckKind::Term)
            .await
            .map_err(|e| BrokerError::Disposition(e.to_string()))
    }

    /// Apply a [`Disposition`] decided elsewhere (e.g. after catching a worker error).
    pub async fn finish(self, disposition: Disposition) -> Result<()> {
        match disposition {
            Disposition::Ack => self.ack().await,
            Disposition::Nack => {
                warn!("nacking message for retry");
                self.nack().await
            }
            Disposition::Reject => {
                warn!("rejecting poison message");
                self.reject().await
            }
        }
    }
}
