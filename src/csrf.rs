use once_cell::sync::Lazy;
use regex::Regex;

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta pattern"));
static NAME_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*["']csrf-token["']"#).expect("valid name pattern")
});
static CONTENT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid content pattern")
});

/// Pull the CSRF token out of a saved page, e.g.
/// `<meta name="csrf-token" content="...">`. Attribute order does not matter.
pub fn extract_token(markup: &str) -> Option<String> {
    META_TAG
        .find_iter(markup)
        .map(|m| m.as_str())
        .filter(|tag| NAME_ATTR.is_match(tag))
        .find_map(|tag| {
            let caps = CONTENT_ATTR.captures(tag)?;
            let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
            (!value.is_empty()).then(|| value.to_string())
        })
}
