//! Image payloads: inline `data:` URIs and MIME → file extension mapping.

mod data_uri;
mod mime;

pub use data_uri::{decode_data_uri, DataUri, DataUriError};
pub use mime::{extension_for, extension_from_mime, FALLBACK_EXTENSION};

/// Raw bytes of an image plus its media type (empty if unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl From<DataUri> for FetchedResource {
    fn from(d: DataUri) -> Self {
        Self {
            bytes: d.bytes,
            mime: d.mime,
        }
    }
}
