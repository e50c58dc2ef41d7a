//! Parse HTTP response header lines into ResponseHeaders.

use super::ResponseHeaders;

/// Parse collected header lines into ResponseHeaders.
///
/// curl reports the headers of every response in a redirect chain; a status
/// line (`HTTP/...`) starts a new response, so only the last one is kept.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("HTTP/")) {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                out.content_type = Some(value.to_string());
            }
        }
    }

    out
}

/// Media type without parameters, lowercased: `"Image/PNG; q=1"` → `"image/png"`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
