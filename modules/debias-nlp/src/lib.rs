//! The NLP collaborator contract consumed by the process worker (§6): a pure function
//! `(html, target_id, url, scrape_datetime) -> (title, snippet, article_datetime, keywords,
//! topics)`. Named-entity extraction and zero-shot topic classification are explicitly out
//! of scope for the crawl pipeline itself — this crate only fixes the *shape* of that
//! collaborator (an `async_trait`, the same dyn-dispatch pattern the rest of this codebase
//! uses for external services) and ships a heuristic default so the pipeline runs end to
//! end without a model server. Swap [`HeuristicNlpEngine`] for a real model-backed
//! implementation without touching the process worker.

pub mod config;
pub mod error;

pub use error::{NlpError, Result};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpKeyword {
    pub text: String,
    pub r#type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpTopic {
    pub text: String,
    pub r#type: String,
}

/// The result of processing one article (§6, NLP collaborator contract). `article_datetime:
/// None` means "unusable, drop" — the process worker rejects on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpOutcome {
    pub title: String,
    pub snippet: String,
    pub article_datetime: Option<DateTime<Utc>>,
    pub keywords: Vec<NlpKeyword>,
    pub topics: Vec<NlpTopic>,
}

/// Dyn-compatible NLP collaborator. Determinism is not required by the contract.
#[async_trait]
pub trait NlpEngine: Send + Sync {
    async fn process(
        &self,
        html: &str,
        target_id: &str,
        url: &str,
        scrape_datetime: DateTime<Utc>,
    ) -> Result<NlpOutcome>;
}

/// Regex-and-selector-free heuristic engine: no model download, no GPU, just enough
/// keyword/topic/datetime extraction to exercise the real pipeline end to end.
pub struct HeuristicNlpEngine;

impl Default for HeuristicNlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicNlpEngine {
    pub fn new() -> Self {
        Self
    }

    fn extract_title(&self, document: &Html) -> String {
        let selector = Selector::parse("title").unwrap();
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string())
            .unwrap_or_default()
    }

    fn extract_body_text(&self, document: &Html) -> String {
        let selector = Selector::parse("body").unwrap();
        document
            .select(&selector)
            .next()
            .map(|el| {
                el.text()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    fn extract_article_datetime(&self, document: &Html) -> Option<DateTime<Utc>> {
        if let Ok(selector) = Selector::parse("time[datetime]") {
            for el in document.select(&selector) {
                if let Some(raw) = el.value().attr("datetime") {
                    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                        return Some(dt.with_timezone(&Utc));
                    }
                }
            }
        }
        if let Ok(selector) = Selector::parse(r#"meta[property="article:published_time"]"#) {
            for el in document.select(&selector) {
                if let Some(raw) = el.value().attr("content") {
                    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                        return Some(dt.with_timezone(&Utc));
                    }
                }
            }
        }
        None
    }

    fn extract_keywords(&self, title: &str, body: &str) -> Vec<NlpKeyword> {
        let combined = format!("{title} {title} {body}");
        let mut seen = std::collections::HashSet::new();
        let mut keywords = Vec::new();

        for run in capitalized_runs(&combined) {
            if !config::is_valid_keyword(&run) {
                continue;
            }
            let key = run.to_lowercase();
            if !seen.insert(key) {
                continue;
            }
            keywords.push(NlpKeyword {
                text: run,
                r#type: "ENTITY".to_string(),
            });
            if keywords.len() >= config::MAX_KEYWORDS {
                break;
            }
        }

        keywords
    }

    fn classify_topics(&self, text: &str) -> Vec<NlpTopic> {
        let lower = text.to_lowercase();
        let best = config::NEWS_CATEGORIES
            .iter()
            .find(|category| lower.contains(*category));

        match best {
            Some(category) => vec![NlpTopic {
                text: category.to_string(),
                r#type: "category".to_string(),
            }],
            None => Vec::new(),
        }
    }
}

/// Runs of two-or-more consecutive capitalized words, a cheap stand-in for named-entity spans.
fn capitalized_runs(text: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        let starts_upper = cleaned.chars().next().is_some_and(|c| c.is_uppercase());
        if starts_upper && !cleaned.is_empty() {
            current.push(word);
        } else if !current.is_empty() {
            runs.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        runs.push(current.join(" "));
    }

    runs.into_iter()
        .map(|r| r.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

#[async_trait]
impl NlpEngine for HeuristicNlpEngine {
    async fn process(
        &self,
        html: &str,
        _target_id: &str,
        _url: &str,
        _scrape_datetime: DateTime<Utc>,
    ) -> Result<NlpOutcome> {
        let document = Html::parse_document(html);

        let title = self.extract_title(&document);
        let body = self.extract_body_text(&document);
        let article_datetime = self.extract_article_datetime(&document);
        let keywords = self.extract_keywords(&title, &body);
        let topics = self.classify_topics(&format!("{title} {body}"));

        let snippet: String = body.chars().take(config::SNIPPET_LENGTH).collect();

        Ok(NlpOutcome {
            title,
            snippet,
            article_datetime,
            keywords,
            topics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_title_snippet_and_datetime() {
        let engine = HeuristicNlpEngine::new();
        let html = r#"
            <html>
              <head><title>Local Council Approves New Budget</title></head>
              <body>
                <time datetime="2026-07-20T10:00:00Z"></time>
                <p>The Springfield City Council voted today on the new budget proposal.</p>
              </body>
            </html>
        "#;
        let outcome = engine
            .process(html, "example", "https://example.com/a", Utc::now())
            .await
            .unwrap();

        assert_eq!(outcome.title, "Local Council Approves New Budget");
        assert!(outcome.article_datetime.is_some());
        assert!(outcome.snippet.contains("Springfield"));
    }

    #[tokio::test]
    async fn missing_datetime_is_none() {
        let engine = HeuristicNlpEngine::new();
        let html = "<html><head><title>No Date</title></head><body><p>No timestamp here.</p></body></html>";
        let outcome = engine
            .process(html, "example", "https://example.com/a", Utc::now())
            .await
            .unwrap();
        assert!(outcome.article_datetime.is_none());
    }

    #[tokio::test]
    async fn extracts_capitalized_entity_runs() {
        let engine = HeuristicNlpEngine::new();
        let html = "<html><head><title>Title</title></head><body><p>Springfield City Council met with Jane Doe today.</p></body></html>";
        let outcome = engine
            .process(html, "example", "https://example.com/a", Utc::now())
            .await
            .unwrap();
        let texts: Vec<&str> = outcome.keywords.iter().map(|k| k.text.as_str()).collect();
        assert!(texts.contains(&"Springfield City Council"));
        assert!(texts.contains(&"Jane Doe"));
    }

    #[test]
    fn capitalized_runs_groups_consecutive_words() {
        let runs = capitalized_runs("The Springfield City Council met today");
        assert_eq!(runs, vec!["Springfield City Council".to_string()]);
    }

    #[test]
    fn is_valid_keyword_filters_stopwords_and_publishers() {
        assert!(!config::is_valid_keyword("Said"));
        assert!(!config::is_valid_keyword("BBC News"));
        assert!(!config::is_valid_keyword("123"));
        assert!(config::is_valid_keyword("Springfield"));
    }
}
