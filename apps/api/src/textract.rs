//! Upload-bytes → text. PDF goes through `pdf-extract`; plain text passes
//! through. Everything else (DOC/DOCX conversion, OCR for scanned PDFs) is
//! an external collaborator and is rejected here as unsupported.

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum TextractError {
    #[error("unsupported file format: {0}")]
    Unsupported(String),

    #[error("failed to extract text from PDF: {0}")]
    Pdf(String),

    #[error("file is not valid UTF-8 text")]
    NotUtf8,
}

/// Lowercased extension of a filename.
pub fn file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Extracts raw text from uploaded bytes based on the filename extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, TextractError> {
    match file_extension(filename).as_deref() {
        Some("pdf") => pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            warn!(file_name = filename, error = %e, "PDF text extraction failed");
            TextractError::Pdf(e.to_string())
        }),
        Some("txt") => String::from_utf8(bytes.to_vec()).map_err(|_| TextractError::NotUtf8),
        Some(other) => Err(TextractError::Unsupported(other.to_string())),
        None => Err(TextractError::Unsupported("<no extension>".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_parsing() {
        assert_eq!(file_extension("resume.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension("cv.tar.txt"), Some("txt".to_string()));
        assert_eq!(file_extension("noext"), None);
    }

    #[test]
    fn test_txt_passthrough() {
        let text = extract_text("hello resume".as_bytes(), "cv.txt").unwrap();
        assert_eq!(text, "hello resume");
    }

    #[test]
    fn test_txt_rejects_invalid_utf8() {
        assert!(matches!(
            extract_text(&[0xff, 0xfe, 0x00], "cv.txt"),
            Err(TextractError::NotUtf8)
        ));
    }

    #[test]
    fn test_unsupported_formats_rejected() {
        assert!(matches!(
            extract_text(b"binary", "cv.docx"),
            Err(TextractError::Unsupported(_))
        ));
        assert!(matches!(
            extract_text(b"binary", "cv"),
            Err(TextractError::Unsupported(_))
        ));
    }
}
