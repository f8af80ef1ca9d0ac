//! Metadata store (C4): one append-only row per successful fetch.
//!
//! A scoped transaction maps onto a plain `sqlx::Transaction` here: callers `begin()`, do
//! their writes (including the non-transactional object-store upload in between — see
//! `debias-pipeline`), and `commit()` only once every step of the sequence has succeeded.
//! Dropping the transaction without committing rolls it back.

pub mod error;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use error::{MetaStoreError, Result};

use chrono::{DateTime, Utc};
use debias_common::types::{Metadata, NewMetadata};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

#[derive(Clone)]
pub struct MetaStore {
    pool: PgPool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MetadataRow {
    id: i64,
    target_id: String,
    target_name: String,
    absolute_url: String,
    last_scrape: DateTime<Utc>,
    filepath: String,
    url_hash: String,
    content_hash: String,
    content_size: i64,
}

impl From<MetadataRow> for Metadata {
    fn from(row: MetadataRow) -> Self {
        Metadata {
            id: row.id,
            target_id: row.target_id,
            target_name: row.target_name,
            absolute_url: row.absolute_url,
            last_scrape: row.last_scrape,
            filepath: row.filepath,
            url_hash: row.url_hash,
            content_hash: row.content_hash,
            content_size: row.content_size,
        }
    }
}

impl MetaStore {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await?;
        Ok(Self { pool })
    }

    /// Run the embedded SQL migrations. Idempotent.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Begin a new transaction scope for the finish sequence.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a new metadata row within `tx`, returning the assigned id.
    pub async fn save_in_tx(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        metadata: &NewMetadata,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO metadata
                (target_id, target_name, absolute_url, last_scrape,
                 filepath, url_hash, content_hash, content_size)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&metadata.target_id)
        .bind(&metadata.target_name)
        .bind(&metadata.absolute_url)
        .bind(metadata.last_scrape)
        .bind(&metadata.filepath)
        .bind(&metadata.url_hash)
        .bind(&metadata.content_hash)
        .bind(metadata.content_size)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Look up a metadata row by id. Returns `None` if it does not exist.
    pub async fn read(&self, id: i64) -> Result<Option<Metadata>> {
        let row = sqlx::query_as::<_, MetadataRow>("SELECT * FROM metadata WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Metadata::from))
    }
}
