//! Text extraction — turns an uploaded résumé (PDF or plain text) into best-effort text.
//!
//! Extraction never fails. Unreadable pages are skipped, unreadable documents and
//! unsupported media types produce a placeholder string that callers treat as
//! ordinary text.

mod pdf;

use bytes::Bytes;
use tracing::{debug, warn};

pub const PDF_MIME: &str = "application/pdf";
pub const TEXT_MIME: &str = "text/plain";

/// Extension assumed when the media type is absent or unknown to the registry.
const DEFAULT_EXTENSION: &str = "pdf";

/// An uploaded file exactly as the caller received it. Never persisted.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Bytes,
    pub media_type: Option<String>,
    pub name: Option<String>,
}

impl UploadedFile {
    pub fn new(bytes: impl Into<Bytes>, media_type: Option<String>, name: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type,
            name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extract_text(&self) -> String {
        extract_text(&self.bytes, self.media_type.as_deref(), self.name.as_deref())
    }
}

/// Extracts plain text from raw bytes given the declared media type and file name.
///
/// Dispatch order: declared PDF, declared plain text, then an extension guessed
/// from the media type (absent or unknown types guess PDF).
pub fn extract_text(bytes: &[u8], media_type: Option<&str>, filename: Option<&str>) -> String {
    let mime = normalize_mime(media_type);
    let name = filename.unwrap_or("").to_lowercase();

    if mime == PDF_MIME || name.ends_with(".pdf") {
        return pdf_or_placeholder(bytes, media_type, filename);
    }

    if mime == TEXT_MIME || name.ends_with(".txt") {
        return decode_plain_text(bytes);
    }

    let ext = guess_extension(&mime);
    if ext == "pdf" {
        return pdf_or_placeholder(bytes, media_type, filename);
    }

    debug!(media_type = %mime, ext = %ext, "no text extractor for upload");
    unsupported_placeholder(filename, media_type, &ext)
}

/// UTF-8 first, Latin-1 otherwise. Latin-1 maps every byte, so this cannot fail.
pub fn decode_plain_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Guesses a file extension (without the dot) from a media type.
pub fn guess_extension(mime: &str) -> String {
    if mime.is_empty() {
        return DEFAULT_EXTENSION.to_string();
    }
    mime_guess::get_mime_extensions_str(mime)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn pdf_or_placeholder(bytes: &[u8], media_type: Option<&str>, filename: Option<&str>) -> String {
    match pdf::extract_pdf_text(bytes) {
        Some(text) => text,
        None => {
            warn!(
                name = filename.unwrap_or("resume"),
                "PDF could not be opened; substituting placeholder text"
            );
            unsupported_placeholder(filename, media_type, DEFAULT_EXTENSION)
        }
    }
}

fn unsupported_placeholder(filename: Option<&str>, media_type: Option<&str>, ext: &str) -> String {
    let name = filename.filter(|n| !n.is_empty()).unwrap_or("resume");
    let declared = media_type
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!(".{ext}"));
    format!("[{name} uploaded as {declared}; text extraction not supported]")
}

/// Lower-cases and drops media type parameters (`text/plain; charset=utf-8`).
fn normalize_mime(media_type: Option<&str>) -> String {
    media_type
        .unwrap_or("")
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::TailoredResume;
    use crate::render::render_resume;

    fn sample_pdf() -> Vec<u8> {
        let resume: TailoredResume = serde_json::from_value(serde_json::json!({
            "contact": {"name": "Ada Lovelace"},
            "headline": "Analytical Engine Programmer",
            "sections": [
                {"title": "Experience", "items": [{"role": "Programmer", "company": "Babbage"}]}
            ]
        }))
        .unwrap();
        render_resume(&resume).unwrap()
    }

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_plain_text_utf8() {
        let text = extract_text("Résumé".as_bytes(), Some("text/plain"), None);
        assert_eq!(text, "Résumé");
    }

    #[test]
    fn test_plain_text_latin1_fallback_never_fails() {
        // 0xE9 alone is invalid UTF-8 but is 'é' in Latin-1
        let bytes = [b'C', b'a', b'f', 0xE9];
        let text = extract_text(&bytes, None, Some("notes.TXT"));
        assert_eq!(text, "Café");
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        let text = extract_text(b"hello", Some("Text/Plain; charset=utf-8"), None);
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_unsupported_type_yields_placeholder() {
        let text = extract_text(b"\x89PNG....", Some("image/png"), Some("scan.png"));
        assert!(!text.is_empty());
        assert!(text.contains("scan.png"));
        assert!(text.contains("image/png"));
        assert!(text.contains("not supported"));
    }

    #[test]
    fn test_unsupported_type_without_name_uses_default_name() {
        let text = extract_text(b"data", Some("image/jpeg"), None);
        assert!(text.starts_with("[resume uploaded as image/jpeg"));
    }

    #[test]
    fn test_garbage_declared_pdf_yields_placeholder_not_panic() {
        let text = extract_text(b"definitely not a pdf", Some("application/pdf"), Some("cv.pdf"));
        assert!(!text.is_empty());
        assert!(text.contains("cv.pdf"));
    }

    #[test]
    fn test_guess_extension() {
        assert_eq!(guess_extension("application/pdf"), "pdf");
        assert_eq!(guess_extension(""), "pdf");
        assert_eq!(guess_extension("application/x-not-a-real-type"), "pdf");
        assert_eq!(guess_extension("image/png"), "png");
    }

    #[test]
    fn test_pdf_text_is_extracted() {
        let bytes = sample_pdf();
        let text = extract_text(&bytes, Some("application/pdf"), Some("cv.pdf"));
        let squashed = squash(&text);
        assert!(squashed.contains("AdaLovelace"), "got: {text}");
        assert!(squashed.contains("EXPERIENCE"), "got: {text}");
    }

    #[test]
    fn test_unknown_mime_falls_through_to_pdf() {
        let bytes = sample_pdf();
        let text = extract_text(&bytes, None, None);
        assert!(squash(&text).contains("AdaLovelace"));
    }

    #[test]
    fn test_uploaded_file_delegates() {
        let file = UploadedFile::new(b"plain words".to_vec(), Some("text/plain".into()), None);
        assert!(!file.is_empty());
        assert_eq!(file.extract_text(), "plain words");
    }
}
