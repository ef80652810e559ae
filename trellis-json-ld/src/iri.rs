//! IRI resolution and relativization
//!
//! Relative references in JSON-LD payloads are resolved against the focus
//! IRI (RFC 3986, via the `url` crate); IRIs sharing the focus root
//! (`scheme://authority/`) are written back root-relative.

use trellis_graph_ir::Term;
use trellis_shape::Value;
use url::Url;

/// Returns true if the IRI is absolute (has an RFC 3986 scheme).
///
/// An absolute IRI starts with a scheme: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`.
pub fn is_absolute(iri: &str) -> bool {
    if let Some(colon_pos) = iri.find(':') {
        let scheme = &iri[..colon_pos];
        !scheme.is_empty()
            && scheme.as_bytes()[0].is_ascii_alphabetic()
            && scheme
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
    } else {
        false
    }
}

/// Normalize an absolute IRI; anything `url` can't parse is returned as is
pub fn normalize(iri: &str) -> String {
    Url::parse(iri).map(String::from).unwrap_or_else(|_| iri.to_string())
}

/// Resolve a reference against a base IRI
///
/// The empty reference stands for the base itself (fragment included).
pub fn resolve(base: &str, reference: &str) -> String {
    if reference.is_empty() {
        return normalize(base);
    }

    if is_absolute(reference) {
        return normalize(reference);
    }

    match Url::parse(base).and_then(|base| base.join(reference)) {
        Ok(resolved) => resolved.into(),
        Err(_) => join(base, reference),
    }
}

/// Join base IRI with relative IRI, for bases `url` can't handle
fn join(base: &str, relative: &str) -> String {
    if relative.starts_with('#') {
        format!("{}{}", base.trim_end_matches('#'), relative)
    } else if base.ends_with('/') || base.ends_with('#') {
        format!("{}{}", base, relative)
    } else {
        format!("{}/{}", base, relative)
    }
}

/// The root (`scheme://authority/`) of a hierarchical IRI
pub fn root(iri: &str) -> Option<String> {
    let mut url = Url::parse(iri).ok()?;

    if url.cannot_be_a_base() {
        return None;
    }

    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);

    Some(url.into())
}

/// Root-relative form of an IRI, if it shares `root`
///
/// The leading slash is kept, so the result resolves back against any IRI
/// under the same root.
pub fn relativize(root: &str, iri: &str) -> String {
    match iri.strip_prefix(root) {
        Some(_) if root.ends_with('/') => iri[root.len() - 1..].to_string(),
        _ => iri.to_string(),
    }
}

/// Resolve a constraint operand against the focus IRI
pub fn resolve_value(focus: &str, value: &Value) -> Term {
    match value {
        Value::Term(term) => term.clone(),
        Value::Focus(path) => Term::iri(resolve(focus, path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FOCUS: &str = "https://example.com/people/alice";

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("http://example.org"));
        assert!(is_absolute("urn:isbn:0451450523"));
        assert!(is_absolute("app:/terms#iri"));
        assert!(!is_absolute("/people/bob"));
        assert!(!is_absolute("bob"));
        assert!(!is_absolute(""));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(FOCUS, ""), FOCUS);
        assert_eq!(resolve(FOCUS, "bob"), "https://example.com/people/bob");
        assert_eq!(resolve(FOCUS, "/teams/red"), "https://example.com/teams/red");
        assert_eq!(resolve(FOCUS, "#me"), "https://example.com/people/alice#me");
        assert_eq!(resolve(FOCUS, "urn:example:x"), "urn:example:x");
        assert_eq!(resolve("https://example.com/x#y", ""), "https://example.com/x#y");
    }

    #[test]
    fn test_root() {
        assert_eq!(root(FOCUS).as_deref(), Some("https://example.com/"));
        assert_eq!(
            root("http://localhost:8080/a/b?q=1#f").as_deref(),
            Some("http://localhost:8080/")
        );
        assert_eq!(root("urn:example:x"), None);
    }

    #[test]
    fn test_relativize() {
        let root = "https://example.com/";

        assert_eq!(relativize(root, "https://example.com/people/bob"), "/people/bob");
        assert_eq!(relativize(root, "https://other.org/x"), "https://other.org/x");

        let relative = relativize(root, "https://example.com/people/bob");
        assert_eq!(resolve(FOCUS, &relative), "https://example.com/people/bob");
    }

    #[test]
    fn test_resolve_value() {
        assert_eq!(resolve_value(FOCUS, &Value::focus()), Term::iri(FOCUS));
        assert_eq!(
            resolve_value(FOCUS, &Value::Focus("bob".to_string())),
            Term::iri("https://example.com/people/bob")
        );
        assert_eq!(resolve_value(FOCUS, &Value::from(1i64)), Term::integer(1));
    }
}
