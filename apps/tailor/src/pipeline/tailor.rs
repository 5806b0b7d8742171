//! Tailoring mode: job posting + candidate material → tailored résumé PDF.

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::extraction::UploadedFile;
use crate::models::resume::TailoredResume;
use crate::output::{extract_json, parse_resume};
use crate::pipeline::{PipelineContext, PipelineMode};
use crate::render::render_resume_blocking;

/// A rendered résumé and the name to save it under.
#[derive(Debug, Clone)]
pub struct TailoredDocument {
    pub pdf_bytes: Vec<u8>,
    pub filename: String,
    pub resume: TailoredResume,
}

/// `topic` is the job posting reference handed to the research stage.
pub async fn run_tailor_pipeline(
    ctx: &PipelineContext,
    topic: &str,
    work_experience: Option<&str>,
    resume: Option<&UploadedFile>,
) -> Result<TailoredDocument, PipelineError> {
    let mode = PipelineMode::Tailor;
    let run_id = Uuid::new_v4();
    let span = info_span!("pipeline", %run_id, mode = mode.as_str());

    async move {
        info!(has_resume = resume.is_some(), "tailor run started");

        let writeup = ctx.effective_writeup(work_experience);
        let inputs = ctx.base_inputs(topic, &writeup);
        let raw = ctx.generate(mode, &writeup, resume, inputs).await?;

        let resume = parse_resume(extract_json(&raw))?;
        let filename = resume.suggested_filename();
        let pdf_bytes = render_resume_blocking(resume.clone()).await?;

        info!(%filename, bytes = pdf_bytes.len(), "tailor run finished");
        Ok(TailoredDocument {
            pdf_bytes,
            filename,
            resume,
        })
    }
    .instrument(span)
    .await
}
