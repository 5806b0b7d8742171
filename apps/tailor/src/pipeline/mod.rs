// Pipeline entry points.
// Flow: upload → extraction → workspace → task graph → orchestrator → parse → render.
// The workspace is closed as soon as the orchestrator returns; parsing and
// rendering work on the generated text alone.

pub mod tailor;
pub mod workshop;

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::PipelineError;
use crate::extraction::UploadedFile;
use crate::llm_client::LlmClient;
use crate::stages::{
    LlmWorker, PipelineOrchestrator, RuntimeInputs, StageCatalogue, TaskGraph, Worker,
    INTERVIEW_PREPARATION_TASK, PROFILE_TASK, RESEARCH_TASK, RESUME_STRATEGY_TASK,
    RESUME_WORKSHOP_QUESTIONS_TASK,
};
use crate::tools::build_registry;
use crate::workspace::EphemeralWorkspace;

pub use tailor::{run_tailor_pipeline, TailoredDocument};
pub use workshop::{run_interview_prep_pipeline, run_workshop_pipeline};

pub const JOB_POSTING_URL: &str = "job_posting_url";
pub const GITHUB_URL: &str = "github_url";
pub const PERSONAL_WRITEUP: &str = "personal_writeup";
pub const WORKSHOP_FOCUS: &str = "workshop_focus";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Tailor,
    Workshop,
    InterviewPrep,
}

impl PipelineMode {
    pub fn stage_order(self) -> &'static [&'static str] {
        match self {
            PipelineMode::Tailor => &[RESEARCH_TASK, PROFILE_TASK, RESUME_STRATEGY_TASK],
            PipelineMode::Workshop => &[RESUME_WORKSHOP_QUESTIONS_TASK],
            PipelineMode::InterviewPrep => &[
                RESEARCH_TASK,
                PROFILE_TASK,
                RESUME_STRATEGY_TASK,
                INTERVIEW_PREPARATION_TASK,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineMode::Tailor => "tailor",
            PipelineMode::Workshop => "workshop",
            PipelineMode::InterviewPrep => "interview_prep",
        }
    }
}

/// Long-lived collaborators shared by every pipeline run.
#[derive(Clone)]
pub struct PipelineContext {
    pub worker: Arc<dyn Worker>,
    pub catalogue: Arc<StageCatalogue>,
    pub http: reqwest::Client,
    pub serper_api_key: Option<String>,
    pub github_url: Option<String>,
    /// Used when a request carries no work experience of its own.
    pub personal_writeup: Option<String>,
}

impl PipelineContext {
    pub fn new(worker: Arc<dyn Worker>, catalogue: StageCatalogue) -> Self {
        Self {
            worker,
            catalogue: Arc::new(catalogue),
            http: reqwest::Client::new(),
            serper_api_key: None,
            github_url: None,
            personal_writeup: None,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_max_attempts)
            .context("Failed to build LLM client")?;
        let catalogue = StageCatalogue::load(config.stage_catalogue_path.as_deref())
            .context("Failed to load stage catalogue")?;

        Ok(Self {
            serper_api_key: config.serper_api_key.clone(),
            github_url: config.github_url.clone(),
            personal_writeup: config.personal_writeup.clone(),
            ..Self::new(Arc::new(LlmWorker::new(llm)), catalogue)
        })
    }

    pub fn with_personal_writeup(mut self, writeup: impl Into<String>) -> Self {
        self.personal_writeup = Some(writeup.into());
        self
    }

    pub fn with_github_url(mut self, url: impl Into<String>) -> Self {
        self.github_url = Some(url.into());
        self
    }

    /// The request's work experience, else the configured write-up, else empty.
    pub fn effective_writeup(&self, work_experience: Option<&str>) -> String {
        work_experience
            .filter(|w| !w.is_empty())
            .or(self.personal_writeup.as_deref())
            .unwrap_or_default()
            .to_string()
    }

    /// Runtime inputs shared by all modes.
    fn base_inputs(&self, job_posting_url: &str, writeup: &str) -> RuntimeInputs {
        RuntimeInputs::from([
            (JOB_POSTING_URL.to_string(), job_posting_url.to_string()),
            (
                GITHUB_URL.to_string(),
                self.github_url.clone().unwrap_or_default(),
            ),
            (PERSONAL_WRITEUP.to_string(), writeup.to_string()),
        ])
    }

    /// Extracts the upload, stages artifacts, and runs the mode's stages.
    /// Returns the last stage's raw text. The workspace is gone when this returns.
    async fn generate(
        &self,
        mode: PipelineMode,
        writeup: &str,
        resume: Option<&UploadedFile>,
        inputs: RuntimeInputs,
    ) -> Result<String, PipelineError> {
        let resume_text = match resume.filter(|f| !f.is_empty()) {
            Some(file) => {
                let file = file.clone();
                let text = tokio::task::spawn_blocking(move || file.extract_text())
                    .await
                    .map_err(anyhow::Error::from)?;
                Some(text)
            }
            None => None,
        };

        let work_experience = Some(writeup).filter(|w| !w.is_empty());
        let workspace = EphemeralWorkspace::create(work_experience, resume_text.as_deref())?;

        let result = self.run_stages(mode, &workspace, &inputs).await;

        if let Err(e) = workspace.close() {
            warn!(error = %e, "failed to remove workspace");
        }
        result
    }

    async fn run_stages(
        &self,
        mode: PipelineMode,
        workspace: &EphemeralWorkspace,
        inputs: &RuntimeInputs,
    ) -> Result<String, PipelineError> {
        let registry = build_registry(workspace, &self.http, self.serper_api_key.as_deref());
        let plan = TaskGraph::build(&self.catalogue, &registry)?.select(mode.stage_order())?;
        debug!(stages = ?plan.stage_names(), "execution plan ready");

        PipelineOrchestrator::new(self.worker.clone())
            .run(&plan, inputs)
            .await
    }
}
