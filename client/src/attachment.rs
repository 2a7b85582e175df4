use std::path::Path;

use base64::Engine;
use thiserror::Error;

/// Size ceiling for outbound images: 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("Not an image file: {0}")]
    NotAnImage(String),

    #[error("Image is {size} bytes, over the {MAX_IMAGE_BYTES} byte limit")]
    TooLarge { size: u64 },

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Image mime type by file extension, or None for anything that is not a
/// supported image.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();

    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn check_size(size: u64) -> Result<(), AttachmentError> {
    if size > MAX_IMAGE_BYTES {
        return Err(AttachmentError::TooLarge { size });
    }
    Ok(())
}

fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Read an image file and encode it as a data URL suitable for a message body.
///
/// Rejections (wrong type, over the size limit) happen before the file
/// contents are read, so nothing is emitted for a bad pick. The read runs to
/// completion or error; there is no cancellation.
pub async fn load_image(path: &Path) -> Result<String, AttachmentError> {
    let mime = image_mime(path)
        .ok_or_else(|| AttachmentError::NotAnImage(path.display().to_string()))?;

    let metadata = tokio::fs::metadata(path).await?;
    check_size(metadata.len())?;

    let bytes = tokio::fs::read(path).await?;
    Ok(encode_data_url(mime, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("photo.png")), Some("image/png"));
        assert_eq!(image_mime(Path::new("photo.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("anim.gif")), Some("image/gif"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("no_extension")), None);
    }

    #[test]
    fn test_check_size_limit() {
        assert!(check_size(MAX_IMAGE_BYTES).is_ok());
        // A 6 MiB image is over the line.
        assert!(matches!(
            check_size(6 * 1024 * 1024),
            Err(AttachmentError::TooLarge { size }) if size == 6 * 1024 * 1024
        ));
    }

    #[test]
    fn test_encode_data_url() {
        let url = encode_data_url("image/png", b"abc");

        assert_eq!(url, "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn test_load_image_rejects_text_file() {
        let path = std::env::temp_dir().join("parlor_attachment_test.txt");
        tokio::fs::write(&path, b"plain text").await.unwrap();

        let result = load_image(&path).await;
        tokio::fs::remove_file(&path).await.ok();

        assert!(matches!(result, Err(AttachmentError::NotAnImage(_))));
    }

    #[tokio::test]
    async fn test_load_image_encodes_data_url() {
        let path = std::env::temp_dir().join("parlor_attachment_test.png");
        tokio::fs::write(&path, b"not really a png").await.unwrap();

        let result = load_image(&path).await;
        tokio::fs::remove_file(&path).await.ok();

        let url = result.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
