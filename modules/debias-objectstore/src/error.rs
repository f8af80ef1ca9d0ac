use thiserror::Error;

pub type Result<T> = std::result::Result<T, ObjectStoreError>;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("failed to upload {key}: {message}")]
    Upload { key: String, message: String },

    #[error("failed to download {key}: {message}")]
    Download { key: String, message: String },

    #[error("downloaded object {key} is not valid UTF-8: {message}")]
    NotUtf8 { key: String, message: String },
}
