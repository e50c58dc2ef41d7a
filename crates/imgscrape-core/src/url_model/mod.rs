//! Local filename derivation for downloaded images.
//!
//! The file stem comes from the image's `alt` label (reduced to its last
//! path segment and sanitized); images without a usable label are named
//! `image-<unix millis>`.

mod path;
mod sanitize;

pub use path::{extension_from_url_path, filename_from_url_path};
pub use sanitize::sanitize_label;

use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of the timestamp-based fallback name.
const FALLBACK_PREFIX: &str = "image";

/// Milliseconds since the Unix epoch (0 if the clock is before 1970).
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// File stem for an image label; `image-<millis>` when the label is empty
/// or sanitizes to nothing.
pub fn file_stem(label: &str, millis: u128) -> String {
    let base = label
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let sanitized = sanitize_label(base);
    if sanitized.is_empty() {
        format!("{}-{}", FALLBACK_PREFIX, millis)
    } else {
        sanitized
    }
}

/// Full file name `<stem>.<ext>` for an image.
///
/// # Examples
///
/// - `image_filename("Sunset", "jpeg", 1)` → `"Sunset.jpeg"`
/// - `image_filename("", "png", 1700000000000)` → `"image-1700000000000.png"`
pub fn image_filename(label: &str, ext: &str, millis: u128) -> String {
    format!("{}.{}", file_stem(label, millis), ext)
}
