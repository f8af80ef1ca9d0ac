use thiserror::Error;

pub type Result<T> = std::result::Result<T, NlpError>;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("failed to extract article from html: {0}")]
    Extraction(String),
}
