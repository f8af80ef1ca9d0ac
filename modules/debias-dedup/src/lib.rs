//! Dedup cache (C5): short-lived keyed flags used to recognize URLs and content
//! the pipeline has recently handled (§3 "Dedup flags", §4.4).
//!
//! The cache exposes plain `get`/`set` with TTL — no compare-and-set is required, since
//! the dedup window is advisory and the downstream pipeline tolerates occasional
//! duplicates (see DESIGN.md).

pub mod error;

pub use error::{DedupError, Result};

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// TTL for `url_hash:{h}` — "URL recently handled".
pub const URL_HASH_TTL_SECS: u64 = 12 * 60 * 60;
/// TTL for `content_hash:{h}` — "last observed body for this URL".
pub const CONTENT_HASH_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// TTL for `render:url_hash:{h}` — "URL recently enqueued for render".
pub const RENDER_TTL_SECS: u64 = 12 * 60 * 60;

#[derive(Clone)]
pub struct DedupCache {
    manager: ConnectionManager,
}

impl DedupCache {
    pub async fn connect(dsn: &str) -> Result<Self> {
        let client = redis::Client::open(dsn)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }

    /// Raw `GET key`. A missing flag comes back as `None` — treat as fresh (§3 invariant).
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        Ok(conn.get(key).await?)
    }

    /// Raw `SET key value EX ttl_secs`.
    pub async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    /// Has `url_hash:{url_hash}` been set within the last 12h?
    pub async fn url_recently_handled(&self, url_hash: &str) -> Result<bool> {
        Ok(self.get(&url_key(url_hash)).await?.is_some())
    }

    /// Mark `url_hash:{url_hash}` as handled for 12h.
    pub async fn mark_url_handled(&self, url_hash: &str) -> Result<()> {
        self.set(&url_key(url_hash), "1", URL_HASH_TTL_SECS).await
    }

    /// The content hash last observed for this URL, if any (§4.6 step 5).
    pub async fn cached_content_hash(&self, url_hash: &str) -> Result<Option<String>> {
        self.get(&content_key(url_hash)).await
    }

    /// Record `content_hash` as the current body for this URL, for 30 days.
    pub async fn set_content_hash(&self, url_hash: &str, content_hash: &str) -> Result<()> {
        self.set(&content_key(url_hash), content_hash, CONTENT_HASH_TTL_SECS)
            .await
    }

    /// Has `render:url_hash:{url_hash}` been set within the last 12h?
    pub async fn render_recently_enqueued(&self, url_hash: &str) -> Result<bool> {
        Ok(self.get(&render_key(url_hash)).await?.is_some())
    }

    /// Mark `render:url_hash:{url_hash}` as enqueued for 12h.
    pub async fn mark_render_enqueued(&self, url_hash: &str) -> Result<()> {
        self.set(&render_key(url_hash), "1", RENDER_TTL_SECS).await
    }
}

fn url_key(url_hash: &str) -> String {
    format!("url_hash:{url_hash}")
}

fn content_key(url_hash: &str) -> String {
    format!("content_hash:{url_hash}")
}

fn render_key(url_hash: &str) -> String {
    format!("render:url_hash:{url_hash}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttls_match_the_documented_windows() {
        assert_eq!(URL_HASH_TTL_SECS, 43_200);
        assert_eq!(CONTENT_HASH_TTL_SECS, 2_592_000);
        assert_eq!(RENDER_TTL_SECS, 43_200);
    }

    #[test]
    fn key_layout_matches_documented_format() {
        assert_eq!(url_key("abc"), "url_hash:abc");
        assert_eq!(content_key("abc"), "content_hash:abc");
        assert_eq!(render_key("abc"), "render:url_hash:abc");
    }

    #[test]
    fn type_is_clone_and_send() {
        fn assert_bounds<T: Clone + Send + Sync>() {}
        assert_bounds::<DedupCache>();
    }
}
