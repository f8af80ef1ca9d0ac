//! URL utilities (C1): normalization, domain extraction, relative-ref joining, hashing.
//!
//! These are plain string manipulations rather than a wrapper around the `url` crate:
//! host case is deliberately left untouched on normalize (see DESIGN.md), which the
//! `url` crate's WHATWG parser would change for us whether we liked it or not.

use sha2::{Digest, Sha256};

/// Split a URL into (scheme, host, path, query, fragment). Each part excludes its separator.
/// Parts that are absent come back as empty strings.
fn split(url: &str) -> (&str, &str, &str, &str, &str) {
    let (scheme, rest) = match url.split_once("://") {
        Some((s, r)) => (s, r),
        None => ("", url),
    };

    let (authority_and_path, fragment) = match rest.split_once('#') {
        Some((a, f)) => (a, f),
        None => (rest, ""),
    };
    let (authority_and_path, query) = match authority_and_path.split_once('?') {
        Some((a, q)) => (a, q),
        None => (authority_and_path, ""),
    };

    let (host, path) = match authority_and_path.find('/') {
        Some(idx) => (&authority_and_path[..idx], &authority_and_path[idx..]),
        None => (authority_and_path, ""),
    };

    (scheme, host, path, query, fragment)
}

/// Percent-encode a path, leaving `/` and `%` untouched (mirrors `urllib.parse.quote(path, "/%")`).
fn quote_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        let is_unreserved = byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~');
        if is_unreserved || byte == b'/' || byte == b'%' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Normalize a URL: percent-encode the path (preserving `/` and `%`), drop the query string
/// and fragment, and reassemble `scheme://host<path>`. Idempotent. The path has no trailing
/// slash unless the input path was exactly `/`.
pub fn normalize(url: &str) -> String {
    let (scheme, host, path, _query, _fragment) = split(url);
    let mut encoded = quote_path(path);
    if encoded.len() > 1 && encoded.ends_with('/') {
        encoded.pop();
    }
    format!("{scheme}://{host}{encoded}")
}

/// The host component of a URL. Empty string if the URL carries no scheme.
pub fn domain_of(url: &str) -> String {
    let (scheme, host, ..) = split(url);
    if scheme.is_empty() {
        String::new()
    } else {
        host.to_string()
    }
}

/// Resolve `relative` against `root`. If `relative` is already absolute (`http(s)://`), it is
/// returned unchanged. Otherwise `root` is given a default `https://` scheme, its trailing
/// slash is stripped, `relative` is given a leading slash, and the two are concatenated.
///
/// Deliberately does not resolve `..` segments — see DESIGN.md.
pub fn absolute(root: &str, relative: &str) -> String {
    if relative.starts_with("http://") || relative.starts_with("https://") {
        return relative.to_string();
    }

    let mut root = root.to_string();
    if !root.starts_with("http://") && !root.starts_with("https://") {
        root = format!("https://{root}");
    }
    while root.ends_with('/') {
        root.pop();
    }

    let relative = if let Some(stripped) = relative.strip_prefix('/') {
        stripped
    } else {
        relative
    };

    format!("{root}/{relative}")
}

/// SHA-256 of the UTF-8 bytes of `s`, rendered as lowercase hex.
pub fn hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_query_and_fragment() {
        assert_eq!(
            normalize("https://example.com/a/b?x=1#frag"),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("https://example.com/a%20b?x=1");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_root_path_keeps_single_slash() {
        assert_eq!(normalize("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn normalize_drops_trailing_slash_otherwise() {
        assert_eq!(normalize("https://example.com/a/"), "https://example.com/a");
    }

    #[test]
    fn normalize_preserves_host_case() {
        assert_eq!(
            normalize("https://Example.COM/Path"),
            "https://Example.COM/Path"
        );
    }

    #[test]
    fn normalize_encodes_unsafe_path_bytes() {
        assert_eq!(
            normalize("https://example.com/a b"),
            "https://example.com/a%20b"
        );
    }

    #[test]
    fn domain_of_extracts_host() {
        assert_eq!(domain_of("https://example.com/a"), "example.com");
    }

    #[test]
    fn domain_of_empty_without_scheme() {
        assert_eq!(domain_of("example.com/a"), "");
    }

    #[test]
    fn absolute_passes_through_absolute_urls() {
        assert_eq!(
            absolute("example.com", "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn absolute_joins_relative_ref() {
        assert_eq!(absolute("example.com", "/b"), "https://example.com/b");
        assert_eq!(absolute("example.com/", "b"), "https://example.com/b");
    }

    #[test]
    fn absolute_is_a_fixed_point_once_applied() {
        // absolute(root, absolute(root, rel)) == absolute(root, rel): the first application
        // already produces an http(s):// URL, so the second application is a pass-through.
        let rel = "b";
        let once = absolute("example.com", rel);
        let twice = absolute("example.com", &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn absolute_does_not_resolve_dotdot() {
        assert_eq!(
            absolute("example.com/a/b", "../c"),
            "https://example.com/a/b/../c"
        );
    }

    #[test]
    fn hash_is_deterministic_lowercase_hex() {
        let h = hash("hello");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
        assert_eq!(h, hash("hello"));
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        assert_ne!(hash("hello"), hash("world"));
    }
}
