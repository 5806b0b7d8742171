//! PDF text recovery.
//!
//! `pdf-extract` gives the best text but works on the whole document and is known
//! to panic on malformed input. When it fails, `lopdf` walks the page tree and
//! extracts page by page so one broken page does not cost the rest.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

/// Returns the document's text, or `None` if the bytes cannot be opened as a PDF.
pub(crate) fn extract_pdf_text(bytes: &[u8]) -> Option<String> {
    let pages = whole_document(bytes).or_else(|| page_by_page(bytes))?;
    debug!(pages = pages.len(), "extracted PDF text");
    Some(join_pages(&pages))
}

fn whole_document(bytes: &[u8]) -> Option<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));
    match result {
        Ok(Ok(pages)) => Some(pages),
        Ok(Err(e)) => {
            debug!(error = ?e, "whole-document extraction failed; trying page by page");
            None
        }
        Err(_) => {
            warn!("PDF parser panicked; trying page by page");
            None
        }
    }
}

fn page_by_page(bytes: &[u8]) -> Option<Vec<String>> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(error = %e, "PDF could not be loaded");
            return None;
        }
    };

    let mut pages = Vec::new();
    for page_number in doc.get_pages().into_keys() {
        let result = panic::catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[page_number])));
        match result {
            Ok(Ok(text)) => pages.push(text),
            Ok(Err(e)) => debug!(page = page_number, error = %e, "skipping unreadable page"),
            Err(_) => debug!(page = page_number, "skipping page that panicked the parser"),
        }
    }
    Some(pages)
}

fn join_pages(pages: &[String]) -> String {
    pages.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};
    use serde_json::json;

    /// Two pages: the first carries text, the second's content stream points
    /// at an object that does not exist.
    fn pdf_with_broken_second_page() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(b"GoodPageText".to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let good = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        let broken = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => Object::Reference((9_999, 0)),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![good.into(), broken.into()],
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_unreadable_page_is_skipped() {
        let bytes = pdf_with_broken_second_page();

        let pages = page_by_page(&bytes).unwrap();
        assert_eq!(join_pages(&pages), "GoodPageText");

        let text = extract_pdf_text(&bytes).unwrap();
        assert!(text.contains("GoodPageText"), "got: {text:?}");
    }

    #[test]
    fn test_multi_page_text_is_concatenated() {
        let bullets: Vec<String> = (0..150).map(|i| format!("Shipped milestone{i:03}")).collect();
        let resume = serde_json::from_value(json!({
            "contact": {"name": "Jane Doe"},
            "sections": [{"title": "Experience", "items": [{
                "role": "Engineer",
                "company": "Acme",
                "bullets": bullets,
            }]}]
        }))
        .unwrap();
        let bytes = crate::render::render_resume(&resume).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 2);

        let text: String = extract_pdf_text(&bytes)
            .unwrap()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert!(text.contains("milestone000"));
        assert!(text.contains("milestone149"));

        let pages = page_by_page(&bytes).unwrap();
        assert_eq!(pages.len(), doc.get_pages().len());
    }

    #[test]
    fn test_join_pages_trims_outer_whitespace_only() {
        let pages = vec!["\n  page one".to_string(), "page two  \n".to_string()];
        assert_eq!(join_pages(&pages), "page one\npage two");
    }

    #[test]
    fn test_non_pdf_bytes_return_none() {
        assert!(extract_pdf_text(b"%PDF-garbage").is_none());
        assert!(extract_pdf_text(b"").is_none());
    }
}
