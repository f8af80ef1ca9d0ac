//! Shared data model (§3): target configuration, queue payloads, and the metadata record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Render policy for a [`Target`]. Closed tri-value — unknown strings are rejected at config
/// load rather than silently defaulting (see DESIGN.md, "dynamic config as enumerated options").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderPolicy {
    Auto,
    Always,
    Never,
}

/// Immutable per-site crawl configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub root_url: String,
    #[serde(default = "default_true")]
    pub domain_only: bool,
    #[serde(default)]
    pub render: RenderPolicy,
    #[serde(default)]
    pub text_selector: String,
    #[serde(default = "default_href_selector")]
    pub href_selector: String,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        RenderPolicy::Auto
    }
}

fn default_true() -> bool {
    true
}

fn default_href_selector() -> String {
    "a[href]".to_string()
}

impl Target {
    /// The domain this target is keyed by, derived from `root_url`.
    pub fn root_domain(&self) -> String {
        crate::url::domain_of(&self.root_url)
    }
}

/// Work item published to `fetch-queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    pub url: String,
}

/// Work item published to `render-queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub url: String,
}

/// Work item published to `process-queue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
    pub target_id: String,
    pub filepath: String,
    pub metadata: i64,
    pub datetime: DateTime<Utc>,
}

/// One row per successful fetch (§3, "Metadata record"). Append-only; never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub id: i64,
    pub target_id: String,
    pub target_name: String,
    pub absolute_url: String,
    pub last_scrape: DateTime<Utc>,
    pub filepath: String,
    pub url_hash: String,
    pub content_hash: String,
    pub content_size: i64,
}

/// Fields needed to insert a new [`Metadata`] row; `id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMetadata {
    pub target_id: String,
    pub target_name: String,
    pub absolute_url: String,
    pub last_scrape: DateTime<Utc>,
    pub filepath: String,
    pub url_hash: String,
    pub content_hash: String,
    pub content_size: i64,
}

/// The object-store key for a given target/url_hash/content_hash triple (§3, "Object-store
/// artifact").
pub fn object_key(target_id: &str, url_hash: &str, content_hash: &str) -> String {
    format!("{target_id}/{url_hash}/{content_hash}.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_layout() {
        assert_eq!(object_key("BBC", "abc", "def"), "BBC/abc/def.html");
    }

    #[test]
    fn render_policy_parses_lowercase() {
        let p: RenderPolicy = serde_json::from_str("\"always\"").unwrap();
        assert_eq!(p, RenderPolicy::Always);
    }

    #[test]
    fn render_policy_rejects_unknown() {
        let err = serde_json::from_str::<RenderPolicy>("\"sometimes\"");
        assert!(err.is_err());
    }
}
