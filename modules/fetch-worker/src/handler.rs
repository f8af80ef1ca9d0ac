//! Fetch worker sequence (§4.6): normalize, dedup-check, GET, dedup-mark, and branch on the
//! target's render policy.

use debias_broker::{Disposition, RENDER_QUEUE};
use debias_common::types::{FetchRequest, RenderPolicy, RenderRequest};
use debias_common::url::{domain_of, hash, normalize};
use debias_pipeline::{expand_frontier, finish, FinishInput};
use tracing::{info, warn};

use crate::clients::Clients;

const AUTO_RENDER_THRESHOLD: usize = 300;

pub async fn handle_fetch(req: FetchRequest, clients: &Clients) -> Disposition {
    let url = normalize(&req.url);

    let parser = match clients.parsers.lookup(&domain_of(&url)) {
        Some(p) => p,
        None => {
            warn!(url = %url, "no parser registered for domain, rejecting");
            return Disposition::Reject;
        }
    };

    let url_hash = hash(&url);
    match clients.dedup.url_recently_handled(&url_hash).await {
        Ok(true) => {
            warn!(url = %url, url_hash = %url_hash, "url recently handled, rejecting");
            return Disposition::Reject;
        }
        Ok(false) => {}
        Err(e) => {
            warn!(url = %url, error = %e, "dedup cache unreachable");
            return Disposition::Nack;
        }
    }
    if let Err(e) = clients.dedup.mark_url_handled(&url_hash).await {
        warn!(url = %url, error = %e, "failed to mark url as handled");
        return Disposition::Nack;
    }

    let response = match clients.http.get(&url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!(url = %url, error = %e, "fetch failed, will retry");
            return Disposition::Nack;
        }
    };
    if !response.status().is_success() {
        warn!(url = %url, status = %response.status(), "non-2xx response, will retry");
        return Disposition::Nack;
    }

    let content = match response.text().await {
        Ok(c) => c,
        Err(e) => {
            warn!(url = %url, error = %e, "failed to read response body");
            return Disposition::Nack;
        }
    };
    let content_hash = hash(&content);

    match clients.dedup.cached_content_hash(&url_hash).await {
        Ok(Some(cached)) if cached == content_hash => {
            info!(url = %url, "content unchanged since last scrape, skipping");
            return Disposition::Ack;
        }
        Ok(_) => {}
        Err(e) => {
            warn!(url = %url, error = %e, "dedup cache unreachable");
            return Disposition::Nack;
        }
    }
    if let Err(e) = clients.dedup.set_content_hash(&url_hash, &content_hash).await {
        warn!(url = %url, error = %e, "failed to record content hash");
        return Disposition::Nack;
    }

    let target = parser.target();
    match target.render {
        RenderPolicy::Never => run_finish(clients, &parser, &url, &url_hash, &content, &content_hash).await,
        RenderPolicy::Always => enqueue_render(clients, &url).await,
        RenderPolicy::Auto => {
            let sample = parser.extract_text(&content);
            if sample.chars().count() < AUTO_RENDER_THRESHOLD {
                enqueue_render(clients, &url).await
            } else {
                run_finish(clients, &parser, &url, &url_hash, &content, &content_hash).await
            }
        }
    }
}

async fn enqueue_render(clients: &Clients, url: &str) -> Disposition {
    match clients
        .broker
        .publish(RENDER_QUEUE, &RenderRequest { url: url.to_string() })
        .await
    {
        Ok(()) => Disposition::Ack,
        Err(e) => {
            warn!(url = %url, error = %e, "failed to publish render request");
            Disposition::Nack
        }
    }
}

async fn run_finish(
    clients: &Clients,
    parser: &debias_parser::TargetParser,
    url: &str,
    url_hash: &str,
    content: &str,
    content_hash: &str,
) -> Disposition {
    let target = parser.target();
    let result = finish(
        &clients.metastore,
        &clients.object_store,
        &clients.broker,
        FinishInput {
            target_id: &target.id,
            target_name: &target.name,
            url,
            url_hash,
            content,
            content_hash,
        },
    )
    .await;

    if let Err(e) = result {
        warn!(url = %url, error = %e, "finish sequence failed, will retry");
        return Disposition::Nack;
    }

    if let Err(e) = expand_frontier(parser, content, url, &clients.broker).await {
        warn!(url = %url, error = %e, "frontier expansion failed, will retry");
        return Disposition::Nack;
    }

    Disposition::Ack
}
