//! `data:[<mediatype>][;base64],<payload>` decoding.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use thiserror::Error;

/// Decoded inline resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Lowercased media type without parameters; empty if the URI has none.
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DataUriError {
    #[error("not a data URI")]
    NotDataUri,
    #[error("data URI has no ',' separating header and payload")]
    MissingComma,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decodes a `data:` URI. Base64 payloads tolerate whitespace, missing or
/// present padding, and percent-escapes; other payloads are percent-decoded.
pub fn decode_data_uri(uri: &str) -> Result<DataUri, DataUriError> {
    let rest = match uri.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("data:") => &uri[5..],
        _ => return Err(DataUriError::NotDataUri),
    };
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingComma)?;

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let unescaped = urlencoding::decode_binary(payload.as_bytes());
    let bytes = if is_base64 {
        let compact: Vec<u8> = unescaped
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let end = compact
            .iter()
            .rposition(|&b| b != b'=')
            .map_or(0, |i| i + 1);
        STANDARD_NO_PAD.decode(&compact[..end])?
    } else {
        unescaped.into_owned()
    };

    Ok(DataUri { mime, bytes })
}
