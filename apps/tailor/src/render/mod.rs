// Document rendering: TailoredResume → story of blocks → flowed pages → PDF bytes.
// Layout is CPU-bound; async callers go through `render_resume_blocking`.

pub mod font_metrics;
pub mod layout;
pub mod pdf_writer;

use thiserror::Error;
use tracing::debug;

use crate::models::resume::TailoredResume;

pub use layout::{build_story, order_sections, PageGeometry, SectionKind};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Renders a résumé onto US Letter pages. Deterministic for a given input.
pub fn render_resume(resume: &TailoredResume) -> Result<Vec<u8>, RenderError> {
    let geometry = PageGeometry::LETTER;
    let story = layout::build_story(resume);
    let pages = layout::layout(&story, &geometry);
    if pages.len() > 1 {
        debug!(pages = pages.len(), "résumé overflowed a single page");
    }
    pdf_writer::write_pdf(&pages, &geometry)
}

/// Runs `render_resume` on the blocking pool so the async executor stays free.
pub async fn render_resume_blocking(resume: TailoredResume) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || render_resume(&resume)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TailoredResume {
        serde_json::from_value(json!({
            "contact": {"name": "Jane Doe", "email": "jane@example.com"},
            "headline": "Backend Engineer",
            "summary": "Builds reliable services.",
            "sections": [
                {"title": "Projects", "items": [{"name": "tailor", "bullets": ["PDF renderer"]}]},
                {"title": "Education", "items": [{"institution": "MIT", "degree": "BSc"}]},
                {"title": "Experience", "items": [{"role": "Engineer", "company": "Acme"}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_render_is_non_empty_and_deterministic() {
        let a = render_resume(&sample()).unwrap();
        let b = render_resume(&sample()).unwrap();
        assert!(a.starts_with(b"%PDF"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_rendered_sections_appear_in_priority_order() {
        let bytes = render_resume(&sample()).unwrap();
        let text: String = crate::extraction::extract_text(&bytes, Some("application/pdf"), None)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let education = text.find("EDUCATION").unwrap();
        let experience = text.find("EXPERIENCE").unwrap();
        let projects = text.find("PROJECTS").unwrap();
        assert!(education < experience && experience < projects, "got: {text}");
    }

    #[test]
    fn test_write_failure_surfaces_as_render_error() {
        let err = RenderError::from(std::io::Error::new(std::io::ErrorKind::WriteZero, "sink full"));
        assert!(err.to_string().contains("sink full"));
        let err = crate::errors::PipelineError::from(err);
        assert_eq!(err.code(), "RENDER_ERROR");
    }

    #[tokio::test]
    async fn test_render_blocking() {
        let bytes = render_resume_blocking(sample()).await.unwrap();
        assert!(!bytes.is_empty());
    }
}
