//! Loading and validating capture images before upload

use autotoll_types::{Error, Result};
use base64::Engine;
use image::ImageFormat;
use std::path::Path;

/// A validated capture ready for upload
#[derive(Debug, Clone)]
pub struct CapturePayload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    /// data: URI for inline display
    pub preview: String,
}

/// Read an image file, verify it decodes as a known format, and prepare
/// the upload payload plus an inline preview.
pub fn load_capture(path: &Path) -> Result<CapturePayload> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes)
        .map_err(|_| Error::InvalidImage(format!("{} is not a recognized image", path.display())))?;
    let mime = mime_for(format)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string());

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let preview = format!("data:{mime};base64,{encoded}");

    Ok(CapturePayload {
        file_name,
        mime,
        bytes,
        preview,
    })
}

fn mime_for(format: ImageFormat) -> Result<String> {
    let mime = match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        other => {
            return Err(Error::InvalidImage(format!(
                "unsupported image format: {other:?}"
            )))
        }
    };
    Ok(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn loads_a_png_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gate_cam.png");
        RgbImage::new(4, 4).save(&path).unwrap();

        let payload = load_capture(&path).unwrap();
        assert_eq!(payload.file_name, "gate_cam.png");
        assert_eq!(payload.mime, "image/png");
        assert!(payload.preview.starts_with("data:image/png;base64,"));
        assert!(!payload.bytes.is_empty());
    }

    #[test]
    fn rejects_non_image_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image at all").unwrap();

        match load_capture(&path) {
            Err(Error::InvalidImage(_)) => {}
            other => panic!("expected invalid image, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        match load_capture(Path::new("/nonexistent/cap.jpg")) {
            Err(Error::FileNotFound(_)) => {}
            other => panic!("expected file not found, got {other:?}"),
        }
    }
}
