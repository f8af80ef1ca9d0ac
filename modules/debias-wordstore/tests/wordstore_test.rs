#![cfg(feature = "test-utils")]

// Integration tests against a real Postgres instance, exercising the upsert/appearance-count
// testable properties described for the analytics store:
//   count(keyword_appearances where document_id=X) = len(result.keywords), and the same
//   (type, keyword) pair re-upserting increments `count` rather than duplicating the row.
//
// Requirements: Docker (for Postgres via testcontainers)
//
// Run with: cargo test -p debias-wordstore --features test-utils --test wordstore_test

use chrono::Utc;
use debias_wordstore::testutil::wordstore_container;
use debias_wordstore::{Keyword, ProcessingResult, Topic};
use sqlx::PgPool;

fn result(url_hash: &str, keywords: Vec<Keyword>, topics: Vec<Topic>) -> ProcessingResult {
    ProcessingResult {
        title: "Local Council Approves New Budget".to_string(),
        absolute_url: "https://example.com/a".to_string(),
        url_hash: url_hash.to_string(),
        target_id: "example".to_string(),
        scrape_datetime: Utc::now(),
        article_datetime: Some(Utc::now()),
        snippet: "An example snippet".to_string(),
        keywords,
        topics,
    }
}

fn keyword(text: &str) -> Keyword {
    Keyword {
        r#type: "ENTITY".to_string(),
        keyword: text.to_string(),
        count: 1,
    }
}

fn topic(text: &str) -> Topic {
    Topic {
        r#type: "category".to_string(),
        topic: text.to_string(),
        count: 1,
    }
}

#[tokio::test]
async fn appearance_count_matches_keyword_and_topic_counts() {
    let (_container, store, dsn) = wordstore_container().await;
    let pool = PgPool::connect(&dsn).await.expect("raw pool for assertions");

    let document_id = store
        .save(&result(
            "h1",
            vec![keyword("Springfield"), keyword("Jane Doe")],
            vec![topic("politics")],
        ))
        .await
        .expect("save");

    let keyword_appearances: i64 =
        sqlx::query_scalar("SELECT count(*) FROM keyword_appearances WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&pool)
            .await
            .expect("count keyword appearances");
    assert_eq!(keyword_appearances, 2);

    let topic_appearances: i64 =
        sqlx::query_scalar("SELECT count(*) FROM topic_appearances WHERE document_id = $1")
            .bind(document_id)
            .fetch_one(&pool)
            .await
            .expect("count topic appearances");
    assert_eq!(topic_appearances, 1);
}

#[tokio::test]
async fn reupserting_the_same_keyword_increments_count_instead_of_duplicating() {
    let (_container, store, dsn) = wordstore_container().await;
    let pool = PgPool::connect(&dsn).await.expect("raw pool for assertions");

    store
        .save(&result("h2", vec![keyword("Springfield")], vec![]))
        .await
        .expect("first save");
    store
        .save(&result("h3", vec![keyword("Springfield")], vec![]))
        .await
        .expect("second save, different document, same keyword");

    let rows: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM keywords WHERE type = 'ENTITY' AND keyword = 'Springfield'",
    )
    .fetch_one(&pool)
    .await
    .expect("count keyword rows");
    assert_eq!(rows, 1, "the same (type, keyword) pair must not duplicate");

    let count: i64 = sqlx::query_scalar(
        "SELECT count FROM keywords WHERE type = 'ENTITY' AND keyword = 'Springfield'",
    )
    .fetch_one(&pool)
    .await
    .expect("read incremented count");
    assert_eq!(count, 2, "count must increment once per document it appears in");
}

#[tokio::test]
async fn two_documents_for_the_same_keyword_each_get_their_own_appearance_row() {
    let (_container, store, dsn) = wordstore_container().await;
    let pool = PgPool::connect(&dsn).await.expect("raw pool for assertions");

    let doc_a = store
        .save(&result("h4", vec![keyword("Springfield")], vec![]))
        .await
        .expect("save doc a");
    let doc_b = store
        .save(&result("h5", vec![keyword("Springfield")], vec![]))
        .await
        .expect("save doc b");

    assert_ne!(doc_a, doc_b);

    let appearance_rows: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM keyword_appearances ka \
         JOIN keywords k ON k.id = ka.keyword_id \
         WHERE k.keyword = 'Springfield'",
    )
    .fetch_one(&pool)
    .await
    .expect("count appearance rows across both documents");
    assert_eq!(appearance_rows, 2);
}
