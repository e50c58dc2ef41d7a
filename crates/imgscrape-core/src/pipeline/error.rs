//! Per-image failure type.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::resource::DataUriError;

/// Why one image could not be saved. Captured per task by the scheduler.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("decode inline image {src}")]
    DataUri {
        /// Shortened `data:` URI for display.
        src: String,
        #[source]
        source: DataUriError,
    },
    /// Writing the file failed (folder creation, temp write, rename).
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
    #[error("storage task failed: {0}")]
    Join(String),
}
