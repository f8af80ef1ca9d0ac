//! Analytics store (C9's persistence collaborator): one row per processed
//! document plus keyword/topic counters and their per-document appearances.
//!
//! A keyword or topic is upserted once globally (`count` tracks how many
//! documents it has ever appeared in) and a second row in the appearance
//! tables tracks how many times it appeared within this particular document.

pub mod error;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use error::{Result, WordStoreError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub r#type: String,
    pub keyword: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub r#type: String,
    pub topic: String,
    pub count: i64,
}

/// The outcome of processing a single document, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub title: String,
    pub absolute_url: String,
    pub url_hash: String,
    pub target_id: String,
    pub scrape_datetime: DateTime<Utc>,
    pub article_datetime: Option<DateTime<Utc>>,
    pub snippet: String,
    pub keywords: Vec<Keyword>,
    pub topics: Vec<Topic>,
}

#[derive(Clone)]
pub struct WordStore {
    pool: PgPool,
}

impl WordStore {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Persist a processing result: the document row, every keyword/topic
    /// (upserted, count incremented), and their appearances against this
    /// document. All in one transaction.
    pub async fn save(&self, result: &ProcessingResult) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let document_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO documents
                (title, absolute_url, url_hash, target_id, scrape_datetime, article_datetime, snippet)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&result.title)
        .bind(&result.absolute_url)
        .bind(&result.url_hash)
        .bind(&result.target_id)
        .bind(result.scrape_datetime)
        .bind(result.article_datetime)
        .bind(&result.snippet)
        .fetch_one(&mut *tx)
        .await?;

        for keyword in &result.keywords {
            let keyword_id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO keywords (type, keyword, count)
                VALUES ($1, $2, 1)
                ON CONFLICT (type, keyword) DO UPDATE SET count = keywords.count + 1
                RETURNING id
                "#,
            )
            .bind(&keyword.r#type)
            .bind(&keyword.keyword)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO keyword_appearances (keyword_id, document_id, count)
                VALUES ($1, $2, 1)
                ON CONFLICT (keyword_id, document_id) DO UPDATE
                    SET count = keyword_appearances.count + 1
                "#,
            )
            .bind(keyword_id)
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        }

        for topic in &result.topics {
            let topic_id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO topics (type, topic, count)
                VALUES ($1, $2, 1)
                ON CONFLICT (type, topic) DO UPDATE SET count = topics.count + 1
                RETURNING id
                "#,
            )
            .bind(&topic.r#type)
            .bind(&topic.topic)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO topic_appearances (topic_id, document_id, count)
                VALUES ($1, $2, 1)
                ON CONFLICT (topic_id, document_id) DO UPDATE
                    SET count = topic_appearances.count + 1
                "#,
            )
            .bind(topic_id)
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ProcessingResult {
        ProcessingResult {
            title: "Example".to_string(),
            absolute_url: "https://example.com/a".to_string(),
            url_hash: "deadbeef".to_string(),
            target_id: "example".to_string(),
            scrape_datetime: Utc::now(),
            article_datetime: Some(Utc::now()),
            snippet: "An example article".to_string(),
            keywords: vec![Keyword {
                r#type: "noun".to_string(),
                keyword: "example".to_string(),
                count: 1,
            }],
            topics: vec![Topic {
                r#type: "category".to_string(),
                topic: "technology".to_string(),
                count: 1,
            }],
        }
    }

    #[test]
    fn processing_result_round_trips_through_json() {
        let result = sample_result();
        let encoded = serde_json::to_string(&result).unwrap();
        let decoded: ProcessingResult = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.url_hash, result.url_hash);
        assert_eq!(decoded.keywords.len(), 1);
        assert_eq!(decoded.topics.len(), 1);
    }
}
