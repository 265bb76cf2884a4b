use std::path::Path;

use crate::error::IoError;

/// Read a sample manifest, one sample identifier per line.
///
/// Surrounding whitespace is trimmed and blank lines are dropped.
///
/// # Errors
///
/// Fails if the file is missing or lists no sample.
pub fn read_manifest(file_path: impl AsRef<Path>) -> Result<Vec<String>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let entries = std::fs::read_to_string(file_path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();

    if entries.is_empty() {
        return Err(IoError::EmptyManifest(file_path.to_path_buf()));
    }

    log::debug!("read {} entries from {}", entries.len(), file_path.display());

    Ok(entries)
}
