//! Target parser (C2): per-site HTML parsing for the link frontier and a body-text sample.
//!
//! Selectors come from the site's [`Target`] config and are applied with `scraper`, the same
//! CSS-selector engine the rest of this codebase reaches for (see DESIGN.md).

use debias_common::url::{absolute, domain_of};
use debias_common::Target;
use scraper::{Html, Selector};
use tracing::warn;

/// Holds one target's configuration and exposes text/href extraction over raw HTML.
pub struct TargetParser {
    target: Target,
    root_domain: String,
}

impl TargetParser {
    pub fn new(target: Target) -> Self {
        let root_domain = target.root_domain();
        Self { target, root_domain }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The domain this parser is registered under (the key used to look it up).
    pub fn domain(&self) -> &str {
        &self.root_domain
    }

    /// Apply `text_selector` and join the stripped text of matched elements with single
    /// spaces. An empty selector or no matches yields an empty string. Used only to decide
    /// the auto-render path — semantic extraction is the NLP subsystem's job.
    pub fn extract_text(&self, html: &str) -> String {
        if self.target.text_selector.is_empty() {
            return String::new();
        }

        let selector = match Selector::parse(&self.target.text_selector) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %self.target.text_selector, error = %e, "malformed text_selector");
                return String::new();
            }
        };

        let document = Html::parse_document(html);
        let pieces: Vec<String> = document
            .select(&selector)
            .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        pieces.join(" ")
    }

    /// Apply `href_selector`, read each matched element's `href` attribute, skip
    /// missing/empty ones, and (if `domain_only`) keep only hrefs whose domain matches the
    /// target's root domain. Every retained href is returned resolved against the root
    /// domain. Malformed hrefs are logged and skipped, never fatal.
    pub fn extract_hrefs(&self, html: &str) -> Vec<String> {
        let selector = match Selector::parse(&self.target.href_selector) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %self.target.href_selector, error = %e, "malformed href_selector");
                return Vec::new();
            }
        };

        let document = Html::parse_document(html);
        let mut hrefs = Vec::new();
        let mut malformed = 0usize;

        for element in document.select(&selector) {
            let href = match element.value().attr("href") {
                Some(h) if !h.is_empty() => h,
                _ => {
                    malformed += 1;
                    continue;
                }
            };

            // domain_of() of a relative href is empty, so domain_only also filters out
            // same-site relative links whose href carries no scheme of its own.
            if self.target.domain_only && domain_of(href) != self.root_domain {
                continue;
            }

            hrefs.push(absolute(&self.root_domain, href));
        }

        if malformed > 0 {
            warn!(count = malformed, "skipped malformed hrefs");
        }

        hrefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debias_common::RenderPolicy;

    fn target(domain_only: bool) -> Target {
        Target {
            id: "T".into(),
            name: "Test".into(),
            root_url: "https://example.com/".into(),
            domain_only,
            render: RenderPolicy::Auto,
            text_selector: "p".into(),
            href_selector: "a[href]".into(),
        }
    }

    #[test]
    fn extract_text_joins_with_spaces() {
        let parser = TargetParser::new(target(true));
        let html = "<html><body><p>hello</p><p>world</p></body></html>";
        assert_eq!(parser.extract_text(html), "hello world");
    }

    #[test]
    fn extract_text_empty_selector_yields_empty() {
        let mut t = target(true);
        t.text_selector = String::new();
        let parser = TargetParser::new(t);
        assert_eq!(parser.extract_text("<p>hello</p>"), "");
    }

    #[test]
    fn extract_text_no_matches_yields_empty() {
        let parser = TargetParser::new(target(true));
        assert_eq!(parser.extract_text("<div>no paragraphs</div>"), "");
    }

    #[test]
    fn extract_hrefs_skips_missing_and_empty() {
        let mut t = target(true);
        t.domain_only = false;
        let parser = TargetParser::new(t);
        let html = r#"<a href="/b">b</a><a>no href</a><a href="">empty</a>"#;
        let hrefs = parser.extract_hrefs(html);
        assert_eq!(hrefs, vec!["https://example.com/b"]);
    }

    #[test]
    fn extract_hrefs_domain_only_filters_external() {
        let parser = TargetParser::new(target(true));
        let html =
            r#"<a href="https://other.com/x">x</a><a href="https://example.com/y">y</a>"#;
        let hrefs = parser.extract_hrefs(html);
        assert_eq!(hrefs, vec!["https://example.com/y"]);
    }

    #[test]
    fn extract_hrefs_domain_only_also_filters_relative_refs() {
        // domain_of() of a relative href is empty, so it never equals the root domain.
        let parser = TargetParser::new(target(true));
        let hrefs = parser.extract_hrefs(r#"<a href="/y">y</a>"#);
        assert!(hrefs.is_empty());
    }

    #[test]
    fn extract_hrefs_allows_external_when_not_domain_only() {
        let parser = TargetParser::new(target(false));
        let html = r#"<a href="https://other.com/x">x</a>"#;
        let hrefs = parser.extract_hrefs(html);
        assert_eq!(hrefs, vec!["https://other.com/x"]);
    }
}
