use thiserror::Error;

use crate::output::OutputParseError;
use crate::render::RenderError;
use crate::stages::{StageConfigError, WorkerError};

/// Pipeline-level error type.
///
/// Extraction problems never show up here: they are recovered locally with
/// placeholder text. Everything from stage execution onward is surfaced to the
/// caller, which owns user-facing messaging.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Stage configuration error: {0}")]
    StageConfiguration(#[from] StageConfigError),

    #[error("Generation failed in stage '{stage}': {source}")]
    Generation {
        stage: String,
        #[source]
        source: WorkerError,
    },

    #[error("Output parse error: {0}")]
    OutputParse(#[from] OutputParseError),

    #[error("Workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    /// Stable machine-readable code for the caller's error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::StageConfiguration(_) => "STAGE_CONFIGURATION_ERROR",
            PipelineError::Generation { .. } => "GENERATION_FAILURE",
            PipelineError::OutputParse(_) => "OUTPUT_PARSE_FAILURE",
            PipelineError::Workspace(_) => "WORKSPACE_ERROR",
            PipelineError::Render(_) => "RENDER_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message that is safe to show to an end user. Details go to the log.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::StageConfiguration(e) => {
                tracing::error!("Stage configuration error: {e}");
                "The generation pipeline is misconfigured".to_string()
            }
            PipelineError::Generation { stage, source } => {
                tracing::error!("Generation failure in {stage}: {source}");
                "An AI processing error occurred".to_string()
            }
            PipelineError::OutputParse(e) => {
                tracing::error!("Output parse failure: {e}");
                "The generated result could not be understood".to_string()
            }
            PipelineError::Workspace(e) => {
                tracing::error!("Workspace error: {e}");
                "A temporary storage error occurred".to_string()
            }
            PipelineError::Render(e) => {
                tracing::error!("Render error: {e}");
                "The document could not be rendered".to_string()
            }
            PipelineError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_per_category() {
        let unknown = PipelineError::StageConfiguration(StageConfigError::UnknownStage(
            "ghost_task".to_string(),
        ));
        let generation = PipelineError::Generation {
            stage: "research_task".to_string(),
            source: WorkerError::Failed("boom".to_string()),
        };
        assert_eq!(unknown.code(), "STAGE_CONFIGURATION_ERROR");
        assert_eq!(generation.code(), "GENERATION_FAILURE");
        assert!(generation.to_string().contains("research_task"));
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = PipelineError::Internal(anyhow::anyhow!("secret path /tmp/x"));
        assert!(!err.user_message().contains("/tmp/x"));
    }
}
