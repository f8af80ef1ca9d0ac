use thiserror::Error;

pub type Result<T> = std::result::Result<T, WordStoreError>;

#[derive(Debug, Error)]
pub enum WordStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}
