//! MIME → file extension mapping.

use crate::url_model::extension_from_url_path;

/// Extension used when neither the media type nor the URL gives one.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Extension for a media type: the subtype, with a few well-known renames
/// (`image/svg+xml` → `svg`, `image/x-icon` → `ico`). `None` if the type has
/// no usable subtype.
pub fn extension_from_mime(mime: &str) -> Option<String> {
    let essence = crate::fetch::essence(mime);
    let known = match essence.as_str() {
        "image/svg+xml" => Some("svg"),
        "image/x-icon" | "image/vnd.microsoft.icon" => Some("ico"),
        "image/x-ms-bmp" => Some("bmp"),
        _ => None,
    };
    if let Some(ext) = known {
        return Some(ext.to_string());
    }

    let (_, subtype) = essence.split_once('/')?;
    let subtype = subtype.split('+').next().unwrap_or_default();
    if subtype.is_empty() || !subtype.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.') {
        return None;
    }
    Some(subtype.to_string())
}

/// Extension for a downloaded image: from the media type, else from the
/// source URL's path, else [`FALLBACK_EXTENSION`].
pub fn extension_for(mime: &str, src: Option<&str>) -> String {
    extension_from_mime(mime)
        .or_else(|| src.and_then(extension_from_url_path))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
