/// Reading a picked file into an `ImageSource`
use std::path::Path;

use super::encoder::{validate, EncodeError, ImageSource};

/// MIME type guessed from the file extension
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Read `path`, rejecting non-images and oversized files before the
/// whole file is loaded.
pub async fn read_source(path: &Path) -> Result<ImageSource, EncodeError> {
    let mime = guess_mime(path);

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| EncodeError::Io("Failed to read file".to_string()))?;
    validate(&mime, metadata.len().try_into().unwrap_or(usize::MAX))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|_| EncodeError::Io("Failed to read file".to_string()))?;

    Ok(ImageSource { mime, bytes })
}
