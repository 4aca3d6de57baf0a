//! Loading uploaded photos from the file system.

use std::path::Path;

use agrovision_core::error::Result;
use agrovision_core::image::ImagePayload;
use agrovision_core::{AgroError, MediaAccessReason};

/// Reads an image file picked by the user.
///
/// The mime type is guessed from the extension; anything that is not an
/// `image/*` type is refused the way a gallery picker would filter it.
pub async fn load_image_file(path: &Path) -> Result<ImagePayload> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(AgroError::media_access(
            MediaAccessReason::UnsupportedFile,
            format!("'{}' is not an image ({})", path.display(), mime),
        ));
    }

    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(AgroError::media_access(
            MediaAccessReason::UnsupportedFile,
            format!("'{}' is empty", path.display()),
        ));
    }

    tracing::debug!(path = %path.display(), mime = %mime, size = bytes.len(), "Loaded image file");
    Ok(ImagePayload::new(mime.essence_str(), bytes))
}
