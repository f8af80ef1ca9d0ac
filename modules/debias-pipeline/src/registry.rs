//! Read-only map from domain to [`TargetParser`], built once at startup (§5, "Parser map is
//! read-only after startup"). A default-dict of parsers becomes an explicit map lookup
//! returning a nullable — see DESIGN.md.

use std::collections::HashMap;
use std::sync::Arc;

use debias_common::Target;
use debias_parser::TargetParser;

#[derive(Clone)]
pub struct ParserRegistry {
    by_domain: HashMap<String, Arc<TargetParser>>,
}

impl ParserRegistry {
    pub fn from_targets(targets: Vec<Target>) -> Self {
        let by_domain = targets
            .into_iter()
            .map(TargetParser::new)
            .map(|parser| (parser.domain().to_string(), Arc::new(parser)))
            .collect();
        Self { by_domain }
    }

    /// Look up the parser registered for `domain`. Missing parser is a documented branch
    /// (§4.6 step 1, §4.7 step 1), never a panic.
    pub fn lookup(&self, domain: &str) -> Option<Arc<TargetParser>> {
        self.by_domain.get(domain).cloned()
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.by_domain.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use debias_common::RenderPolicy;

    fn target(id: &str, root_url: &str) -> Target {
        Target {
            id: id.to_string(),
            name: id.to_string(),
            root_url: root_url.to_string(),
            domain_only: true,
            render: RenderPolicy::Never,
            text_selector: String::new(),
            href_selector: "a[href]".to_string(),
        }
    }

    #[test]
    fn looks_up_by_root_domain() {
        let registry = ParserRegistry::from_targets(vec![target("BBC", "https://www.bbc.com/")]);
        assert!(registry.lookup("www.bbc.com").is_some());
        assert!(registry.lookup("unregistered.test").is_none());
    }
}
