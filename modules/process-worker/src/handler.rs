//! Process worker sequence (§4.10): look up the metadata row, download the artifact,
//! invoke the NLP collaborator, and persist analytics.

use debias_broker::Disposition;
use debias_common::types::ProcessRequest;
use debias_wordstore::{Keyword, ProcessingResult, Topic};
use tracing::warn;

use crate::clients::Clients;

pub async fn handle_process(req: ProcessRequest, clients: &Clients) -> Disposition {
    let metadata = match clients.metastore.read(req.metadata).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            warn!(metadata_id = req.metadata, "metadata row not found, rejecting");
            return Disposition::Reject;
        }
        Err(e) => {
            warn!(metadata_id = req.metadata, error = %e, "metastore unreachable");
            return Disposition::Nack;
        }
    };

    let content = match clients.object_store.download(&req.filepath).await {
        Ok(c) => c,
        Err(e) => {
            warn!(filepath = %req.filepath, error = %e, "failed to download artifact, will retry");
            return Disposition::Nack;
        }
    };

    let outcome = match clients
        .nlp
        .process(&content, &req.target_id, &req.url, req.datetime)
        .await
    {
        Ok(o) => o,
        Err(e) => {
            warn!(url = %req.url, error = %e, "nlp processing failed, will retry");
            return Disposition::Nack;
        }
    };

    let Some(article_datetime) = outcome.article_datetime else {
        warn!(url = %req.url, "nlp produced no article datetime, rejecting");
        return Disposition::Reject;
    };

    let result = ProcessingResult {
        title: outcome.title,
        absolute_url: metadata.absolute_url,
        url_hash: metadata.url_hash,
        target_id: req.target_id,
        scrape_datetime: req.datetime,
        article_datetime: Some(article_datetime),
        snippet: outcome.snippet,
        keywords: outcome
            .keywords
            .into_iter()
            .map(|k| Keyword {
                r#type: k.r#type,
                keyword: k.text,
                count: 1,
            })
            .collect(),
        topics: outcome
            .topics
            .into_iter()
            .map(|t| Topic {
                r#type: t.r#type,
                topic: t.text,
                count: 1,
            })
            .collect(),
    };

    if let Err(e) = clients.wordstore.save(&result).await {
        warn!(url = %result.absolute_url, error = %e, "failed to persist analytics, will retry");
        return Disposition::Nack;
    }

    Disposition::Ack
}
