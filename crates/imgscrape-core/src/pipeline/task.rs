//! The per-image operation: load bytes, pick a name, write the file.

use std::path::PathBuf;

use crate::config::HttpConfig;
use crate::extract::{is_data_uri, ImageRef};
use crate::fetch::{self, ACCEPT_ANY};
use crate::resource::{self, FetchedResource};
use crate::storage;
use crate::url_model;

use super::error::PipelineError;

/// Shared, read-only settings for every image task of one run.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub folder: PathBuf,
    pub overwrite: bool,
    pub http: HttpConfig,
}

/// Longest prefix of a source reference shown in messages.
const DISPLAY_SRC_CHARS: usize = 80;

/// Source reference shortened for progress lines (inline images can be huge).
pub fn display_src(src: &str) -> String {
    match src.char_indices().nth(DISPLAY_SRC_CHARS) {
        Some((cut, _)) => format!("{}...", &src[..cut]),
        None => src.to_string(),
    }
}

/// Decodes an inline image or downloads a remote one.
pub async fn load_resource(src: &str, http: &HttpConfig) -> Result<FetchedResource, PipelineError> {
    if is_data_uri(src) {
        let decoded = resource::decode_data_uri(src).map_err(|source| PipelineError::DataUri {
            src: display_src(src),
            source,
        })?;
        return Ok(decoded.into());
    }
    let response = fetch::get_async(src, ACCEPT_ANY, http).await?;
    Ok(FetchedResource {
        mime: response.mime(),
        bytes: response.body,
    })
}

/// Saves one image into the context's folder and returns the written path.
pub async fn save_image(image: &ImageRef, ctx: &TaskContext) -> Result<PathBuf, PipelineError> {
    let resource = load_resource(&image.src, &ctx.http).await?;
    let url_hint = (!is_data_uri(&image.src)).then_some(image.src.as_str());
    let ext = resource::extension_for(&resource.mime, url_hint);
    let name = url_model::image_filename(&image.alt, &ext, url_model::now_millis());

    let folder = ctx.folder.clone();
    let overwrite = ctx.overwrite;
    let bytes = resource.bytes;
    let path = tokio::task::spawn_blocking(move || storage::save(&folder, &name, &bytes, overwrite))
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))??;
    Ok(path)
}
