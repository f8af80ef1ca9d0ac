//! The finish sequence (§4.8, shared by C7's non-render path and C8) and frontier expansion
//! (§4.9). Both are called once a fetch or render has produced final HTML for a URL.

use chrono::Utc;
use debias_broker::{Broker, PROCESS_QUEUE};
use debias_common::types::{object_key, FetchRequest, NewMetadata, ProcessRequest};
use debias_common::url::{absolute, domain_of, normalize};
use debias_metastore::MetaStore;
use debias_objectstore::ObjectStore;
use debias_parser::TargetParser;
use tracing::{info, warn};

use crate::error::Result;

/// Everything the finish sequence needs about one successfully fetched/rendered page.
pub struct FinishInput<'a> {
    pub target_id: &'a str,
    pub target_name: &'a str,
    pub url: &'a str,
    pub url_hash: &'a str,
    pub content: &'a str,
    pub content_hash: &'a str,
}

/// Upload the artifact, insert the metadata row, and publish a `ProcessRequest`, all within
/// one metadata-store transaction scope (§4.3, §4.8). If any step fails the transaction rolls
/// back; the object-store upload is not transactional, so on rollback the uploaded blob may
/// be left behind — tolerated, since it is never referenced without a metadata row (§3
/// invariant 3).
pub async fn finish(
    metastore: &MetaStore,
    object_store: &ObjectStore,
    broker: &Broker,
    input: FinishInput<'_>,
) -> Result<i64> {
    let filepath = object_key(input.target_id, input.url_hash, input.content_hash);

    let mut tx = metastore.begin().await?;

    object_store.upload(&filepath, input.content).await?;

    let metadata_id = metastore
        .save_in_tx(
            &mut tx,
            &NewMetadata {
                target_id: input.target_id.to_string(),
                target_name: input.target_name.to_string(),
                absolute_url: normalize(input.url),
                last_scrape: Utc::now(),
                filepath: filepath.clone(),
                url_hash: input.url_hash.to_string(),
                content_hash: input.content_hash.to_string(),
                content_size: input.content.len() as i64,
            },
        )
        .await?;

    broker
        .publish(
            PROCESS_QUEUE,
            &ProcessRequest {
                url: input.url.to_string(),
                target_id: input.target_id.to_string(),
                filepath,
                metadata: metadata_id,
                datetime: Utc::now(),
            },
        )
        .await?;

    tx.commit()
        .await
        .map_err(debias_metastore::MetaStoreError::from)?;
    info!(metadata_id, url = input.url, "finish sequence committed");
    Ok(metadata_id)
}

/// Extract the outgoing-link frontier from `content`, resolve each href against the domain
/// of the page it came from, normalize it, and publish a `FetchRequest` per result — all
/// concurrently. Duplicates are filtered later by the fetcher's own dedup step (§4.9).
pub async fn expand_frontier(
    parser: &TargetParser,
    content: &str,
    url: &str,
    broker: &Broker,
) -> Result<()> {
    let page_domain = domain_of(url);
    let hrefs = parser.extract_hrefs(content);

    let publishes = hrefs.into_iter().map(|href| {
        let next_url = normalize(&absolute(&page_domain, &href));
        async move {
            broker
                .publish(debias_broker::FETCH_QUEUE, &FetchRequest { url: next_url })
                .await
        }
    });

    let results = futures::future::join_all(publishes).await;
    for result in results {
        if let Err(e) = result {
            warn!(error = %e, "failed to publish a frontier fetch request");
            return Err(e.into());
        }
    }

    Ok(())
}
