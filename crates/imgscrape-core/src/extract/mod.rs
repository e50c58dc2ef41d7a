//! Image reference extraction from page markup.
//!
//! Pattern-based, not a DOM parser: finds `<img ...>` tags, reads their `src`
//! and `alt` attributes and resolves relative sources against the page URL.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// One image found in the page: resolved source reference and its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Absolute URL, or a `data:` URI left as-is.
    pub src: String,
    /// `alt` text; empty when the tag has none.
    pub alt: String,
}

struct ImgPatterns {
    tag: Regex,
    attr: Regex,
}

fn patterns() -> &'static ImgPatterns {
    static PATTERNS: OnceLock<ImgPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ImgPatterns {
        tag: Regex::new(r"(?i)<img\b[^>]*>").expect("valid img tag regex"),
        attr: Regex::new(r#"(?i)(?:^|[\s/])(src|alt)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("valid img attribute regex"),
    })
}

/// Returns every `<img>` with a non-empty `src`, in document order.
pub fn extract_images(base_url: &str, html: &str) -> Vec<ImageRef> {
    let base = Url::parse(base_url).ok();
    let p = patterns();

    p.tag
        .find_iter(html)
        .filter_map(|tag| {
            let (src, alt) = tag_attributes(&p.attr, tag.as_str());
            let src = src.filter(|s| !s.trim().is_empty())?;
            Some(ImageRef {
                src: resolve(base.as_ref(), &unescape_amp(src.trim())),
                alt: alt.map(|a| unescape_amp(a.trim())).unwrap_or_default(),
            })
        })
        .collect()
}

/// First `src` and first `alt` attribute values of one tag.
fn tag_attributes<'t>(attr: &Regex, tag: &'t str) -> (Option<&'t str>, Option<&'t str>) {
    // Skip the `<img` prefix so the leading-whitespace anchor lines up with attributes.
    let body = tag.get(4..).unwrap_or_default();
    let mut src = None;
    let mut alt = None;
    for caps in attr.captures_iter(body) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if name.eq_ignore_ascii_case("src") && src.is_none() {
            src = Some(value);
        } else if name.eq_ignore_ascii_case("alt") && alt.is_none() {
            alt = Some(value);
        }
    }
    (src, alt)
}

/// Resolves `reference` against the page URL. `data:` URIs and references
/// that can't be resolved are returned unchanged.
pub fn resolve(base: Option<&Url>, reference: &str) -> String {
    if is_data_uri(reference) {
        return reference.to_string();
    }
    match base.and_then(|b| b.join(reference).ok()) {
        Some(u) => u.to_string(),
        None => reference.to_string(),
    }
}

pub fn is_data_uri(reference: &str) -> bool {
    reference
        .get(..5)
        .is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

fn unescape_amp(s: &str) -> String {
    s.replace("&amp;", "&")
}
