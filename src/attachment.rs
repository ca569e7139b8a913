//! Loading and encoding image attachments from local files.

use std::path::Path;

use anyhow::{anyhow, Result};
use base64::Engine;

use crate::model::ImageAttachment;

/// A successfully loaded attachment plus the display metadata the form
/// preview needs.
#[derive(Debug, Clone)]
pub struct Attached {
    pub image: ImageAttachment,
    pub file_name: String,
    pub bytes: u64,
}

/// Map a file extension to a supported image MIME type.
///
/// The accepted set mirrors the file input boundary: PNG, JPEG, GIF, SVG.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Read a file from disk and encode it as a base64 attachment.
///
/// The MIME check happens here, before any I/O, so an unsupported file is
/// rejected without touching the disk. A read failure is reported as such
/// and the caller treats the image as absent.
pub fn load(path: &Path) -> Result<Attached> {
    let mime_type = mime_type_for(path).ok_or_else(|| {
        anyhow!("Unsupported file type. Please use a PNG, JPEG, GIF, or SVG image.")
    })?;

    let contents = std::fs::read(path)
        .map_err(|e| anyhow!("Failed to read the file: {}", e))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    let data = base64::engine::general_purpose::STANDARD.encode(&contents);

    Ok(Attached {
        image: ImageAttachment {
            mime_type: mime_type.to_string(),
            data,
        },
        file_name,
        bytes: contents.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mime_type_detection() {
        assert_eq!(mime_type_for(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_type_for(Path::new("a.jpg")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("a.gif")), Some("image/gif"));
        assert_eq!(mime_type_for(Path::new("a.svg")), Some("image/svg+xml"));
        assert_eq!(mime_type_for(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_type_for(Path::new("a.webp")), None);
        assert_eq!(mime_type_for(Path::new("noext")), None);
    }

    #[test]
    fn test_load_encodes_file_as_plain_base64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mock.png");
        let payload = b"\x89PNG\r\n\x1a\nfake-image-bytes";
        std::fs::File::create(&path)
            .unwrap()
            .write_all(payload)
            .unwrap();

        let attached = load(&path).unwrap();
        assert_eq!(attached.image.mime_type, "image/png");
        assert_eq!(attached.file_name, "mock.png");
        assert_eq!(attached.bytes, payload.len() as u64);
        assert_eq!(
            attached.image.data,
            base64::engine::general_purpose::STANDARD.encode(payload)
        );
        assert!(!attached.image.data.starts_with("data:"));
    }

    #[test]
    fn test_load_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn test_load_reports_read_failure() {
        let err = load(Path::new("/nonexistent/screenshot.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to read the file"));
    }
}
