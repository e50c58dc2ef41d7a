//! Saving image bytes into the destination folder.
//!
//! Bytes are written to a `.part` temp file next to the destination and
//! renamed into place, so a crash never leaves a truncated image under its
//! final name.

mod writer;

pub use writer::{reserve_unique, write_atomic};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for a temp file: appends `.<seq>.part` to the final path
/// (e.g. `cat.png` → `cat.png.3.part`). `seq` keeps concurrent writers of
/// the same final name apart.
pub fn temp_path(final_path: &Path, seq: u64) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(format!(".{seq}"));
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True if the folder holds no leftover temp files.
#[cfg(test)]
fn no_temp_files(folder: &Path) -> bool {
    std::fs::read_dir(folder)
        .unwrap()
        .flatten()
        .all(|e| !e.file_name().to_string_lossy().ends_with(TEMP_SUFFIX))
}

/// Splits `name.ext` into (`name`, `.ext`); names without a dot get an empty extension.
pub(crate) fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(i) if i > 0 => file_name.split_at(i),
        _ => (file_name, ""),
    }
}

/// Writes `bytes` as `folder/file_name`, creating `folder` (recursively) if needed.
///
/// With `overwrite`, an existing file of that name is replaced. Without it,
/// the first free name of `name.ext`, `name-1.ext`, `name-2.ext`, ... is
/// reserved atomically, so concurrent saves never clobber each other.
/// Returns the path written.
pub fn save(folder: &Path, file_name: &str, bytes: &[u8], overwrite: bool) -> Result<PathBuf> {
    std::fs::create_dir_all(folder)
        .with_context(|| format!("create folder {}", folder.display()))?;

    let final_path = if overwrite {
        folder.join(file_name)
    } else {
        reserve_unique(folder, file_name)?
    };

    if let Err(e) = write_atomic(&final_path, bytes) {
        if !overwrite {
            // Drop the empty placeholder we reserved.
            let _ = std::fs::remove_file(&final_path);
        }
        return Err(e);
    }
    tracing::debug!(path = %final_path.display(), bytes = bytes.len(), "image saved");
    Ok(final_path)
}
