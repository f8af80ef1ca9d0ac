//! Render worker sequence (§4.7): normalize, dedup-check the render flag, headless-render,
//! then run the same finish sequence as the fetch worker's direct path.

use debias_broker::Disposition;
use debias_common::types::RenderRequest;
use debias_common::url::{domain_of, hash, normalize};
use debias_pipeline::{expand_frontier, finish, FinishInput};
use tracing::warn;

use crate::clients::Clients;

pub async fn handle_render(req: RenderRequest, clients: &Clients) -> Disposition {
    let url = normalize(&req.url);

    let parser = match clients.parsers.lookup(&domain_of(&url)) {
        Some(p) => p,
        None => {
            warn!(url = %url, "no parser registered for domain, rejecting");
            return Disposition::Reject;
        }
    };

    let url_hash = hash(&url);
    match clients.dedup.render_recently_enqueued(&url_hash).await {
        Ok(true) => {
            warn!(url = %url, url_hash = %url_hash, "url recently rendered, rejecting");
            return Disposition::Reject;
        }
        Ok(false) => {}
        Err(e) => {
            warn!(url = %url, error = %e, "dedup cache unreachable");
            return Disposition::Nack;
        }
    }
    if let Err(e) = clients.dedup.mark_render_enqueued(&url_hash).await {
        warn!(url = %url, error = %e, "failed to mark url as render-enqueued");
        return Disposition::Nack;
    }

    let content = match clients.renderer.content(&url).await {
        Ok(c) => c,
        Err(e) => {
            warn!(url = %url, error = %e, "render failed, will retry");
            return Disposition::Nack;
        }
    };
    let content_hash = hash(&content);

    let target = parser.target();
    let result = finish(
        &clients.metastore,
        &clients.object_store,
        &clients.broker,
        FinishInput {
            target_id: &target.id,
            target_name: &target.name,
            url: &url,
            url_hash: &url_hash,
            content: &content,
            content_hash: &content_hash,
        },
    )
    .await;

    if let Err(e) = result {
        warn!(url = %url, error = %e, "finish sequence failed, will retry");
        return Disposition::Nack;
    }

    if let Err(e) = expand_frontier(&parser, &content, &url, &clients.broker).await {
        warn!(url = %url, error = %e, "frontier expansion failed, will retry");
        return Disposition::Nack;
    }

    Disposition::Ack
}
