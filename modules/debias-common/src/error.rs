use thiserror::Error;

/// Result type alias used across the crawl pipeline crates.
pub type Result<T> = std::result::Result<T, DebiasError>;

#[derive(Error, Debug)]
pub enum DebiasError {
    #[error("no parser registered for domain: {0}")]
    UnknownTarget(String),

    #[error("url recently handled: {0}")]
    RecentlyHandled(String),

    #[error("metadata row not found: {0}")]
    MetadataNotFound(i64),

    #[error("content unusable: {0}")]
    Unusable(String),

    #[error("transient transport error: {0}")]
    Transient(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
