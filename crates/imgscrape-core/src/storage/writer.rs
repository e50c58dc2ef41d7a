//! Low-level file operations: name reservation and temp-file-then-rename writes.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::{split_extension, temp_path};

/// Process-wide sequence for temp file names.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Upper bound on `-N` suffixes tried before giving up.
const MAX_SUFFIX: u32 = 10_000;

/// Atomically creates an empty placeholder for the first free name among
/// `file_name`, `stem-1.ext`, `stem-2.ext`, ... and returns its path.
pub fn reserve_unique(folder: &Path, file_name: &str) -> Result<PathBuf> {
    let (stem, ext) = split_extension(file_name);
    for n in 0..=MAX_SUFFIX {
        let candidate = if n == 0 {
            folder.join(file_name)
        } else {
            folder.join(format!("{stem}-{n}{ext}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("create {}", candidate.display()));
            }
        }
    }
    anyhow::bail!(
        "no free file name for {} in {}",
        file_name,
        folder.display()
    )
}

/// Writes `bytes` to `final_path` via a `.part` temp file + rename.
/// The temp file is removed on any failure.
pub fn write_atomic(final_path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(final_path, TEMP_SEQ.fetch_add(1, Ordering::Relaxed));
    if let Err(e) = write_and_sync(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&tmp, final_path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| {
            format!("failed to rename {} to {}", tmp.display(), final_path.display())
        });
    }
    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    f.write_all(bytes)
        .with_context(|| format!("write {}", path.display()))?;
    f.sync_all()
        .with_context(|| format!("sync {}", path.display()))?;
    Ok(())
}
