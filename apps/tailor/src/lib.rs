//! Résumé tailoring pipeline: text extraction, staged generation, output
//! parsing and PDF rendering.

pub mod config;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod stages;
pub mod tools;
pub mod workspace;

pub use errors::PipelineError;
pub use extraction::UploadedFile;
pub use pipeline::{
    run_interview_prep_pipeline, run_tailor_pipeline, run_workshop_pipeline, PipelineContext,
    PipelineMode, TailoredDocument,
};
