//! Filename hints from a URL path.

/// Extracts the last path segment from a URL.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment).ok()?;
    if decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded.into_owned())
}

/// Lowercased extension of the URL's last path segment (`.../a.JPG?x=1` → `jpg`).
/// Only short alphanumeric extensions are accepted.
pub fn extension_from_url_path(url: &str) -> Option<String> {
    let name = filename_from_url_path(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/photo.png").as_deref(),
            Some("photo.png")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/my%20pic.gif").as_deref(),
            Some("my pic.gif")
        );
    }

    #[test]
    fn root_or_unparseable() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
        assert_eq!(filename_from_url_path("/relative.png"), None);
        assert_eq!(filename_from_url_path("data:image/png;base64,AAAA"), None);
    }

    #[test]
    fn extension_with_query() {
        assert_eq!(
            extension_from_url_path("https://example.com/file.WEBP?token=abc").as_deref(),
            Some("webp")
        );
    }

    #[test]
    fn extension_rejects_odd_suffixes() {
        assert_eq!(extension_from_url_path("https://example.com/.hidden"), None);
        assert_eq!(extension_from_url_path("https://example.com/archive.tar-gz"), None);
        assert_eq!(extension_from_url_path("https://example.com/page.someverylong"), None);
        assert_eq!(extension_from_url_path("https://example.com/noext"), None);
    }
}
