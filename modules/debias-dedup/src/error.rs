use thiserror::Error;

pub type Result<T> = std::result::Result<T, DedupError>;

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("redis connection error: {0}")]
    Connect(#[from] redis::RedisError),
}
