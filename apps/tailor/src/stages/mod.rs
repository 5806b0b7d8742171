// Multi-stage generation: declarative catalogue → typed task graph → ordered
// execution plan → sequential orchestration over a Worker.
// All model calls go through llm_client via worker::LlmWorker.

pub mod catalogue;
pub mod graph;
pub mod orchestrator;
pub mod prompts;
pub mod worker;

use thiserror::Error;

pub use catalogue::{StageCatalogue, StageDefinition, WorkerProfile};
pub use graph::{ExecutionPlan, NodeId, PlannedStage, StageNode, TaskGraph};
pub use orchestrator::{
    interpolate, PipelineOrchestrator, RuntimeInputs, StageAssignment, StageOutput, Worker,
    WorkerError,
};
pub use worker::LlmWorker;

pub const RESEARCH_TASK: &str = "research_task";
pub const PROFILE_TASK: &str = "profile_task";
pub const RESUME_STRATEGY_TASK: &str = "resume_strategy_task";
pub const INTERVIEW_PREPARATION_TASK: &str = "interview_preparation_task";
pub const RESUME_WORKSHOP_QUESTIONS_TASK: &str = "resume_workshop_questions_task";

/// Problems detected before any stage runs.
#[derive(Debug, Error)]
pub enum StageConfigError {
    #[error("stage '{0}' is not in the catalogue")]
    UnknownStage(String),

    #[error("stage '{stage}' is assigned to unknown worker '{worker}'")]
    UnknownWorker { stage: String, worker: String },

    #[error("stage '{0}' is defined more than once")]
    DuplicateStage(String),

    #[error("stage '{0}' is selected more than once")]
    RepeatedSelection(String),

    #[error("no stages selected")]
    EmptySelection,

    #[error("failed to read stage catalogue: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stage catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}
