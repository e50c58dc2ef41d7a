//! Label → filename stem sanitization.

/// Longest stem kept, in bytes; leaves room for a `-N` suffix and extension
/// under Linux NAME_MAX (255).
const MAX_STEM_BYTES: usize = 200;

/// Sanitizes an `alt` label for use as a file stem.
///
/// - Replaces NUL, path separators, control characters and `:*?"<>|` with `_`
/// - Collapses runs of whitespace to one space and runs of `_` to one
/// - Trims leading/trailing spaces, dots and underscores
/// - Truncates to 200 bytes on a char boundary
pub fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev: Option<char> = None;

    for c in label.chars() {
        let mapped = match c {
            '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => ' ',
            c if c.is_control() => '_',
            c => c,
        };
        if (mapped == ' ' || mapped == '_') && prev == Some(mapped) {
            continue;
        }
        out.push(mapped);
        prev = Some(mapped);
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    let mut take = trimmed.len().min(MAX_STEM_BYTES);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].trim_end().to_string()
}
