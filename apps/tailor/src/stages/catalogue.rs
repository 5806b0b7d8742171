//! Declarative stage catalogue: worker profiles plus stage definitions.
//!
//! The built-in catalogue covers the tailoring, interview-prep and workshop
//! modes. A JSON file of the same shape replaces it wholesale:
//!
//! ```json
//! {
//!   "workers": { "researcher": { "role": "...", "goal": "...", "backstory": "...", "tools": ["scrape_tool"] } },
//!   "stages": [ { "name": "research_task", "instructions": "...", "expected_output": "...",
//!                 "worker": "researcher", "context": [], "tools": [] } ]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::stages::prompts::*;
use crate::stages::{
    StageConfigError, INTERVIEW_PREPARATION_TASK, PROFILE_TASK, RESEARCH_TASK,
    RESUME_STRATEGY_TASK, RESUME_WORKSHOP_QUESTIONS_TASK,
};
use crate::tools::{
    READ_RESUME, READ_WORKEXP, SCRAPE_TOOL, SEARCH_TOOL, SEMANTIC_SEARCH_RESUME,
    SEMANTIC_SEARCH_WORKEXP,
};

pub const RESEARCHER: &str = "researcher";
pub const PROFILER: &str = "profiler";
pub const RESUME_STRATEGIST: &str = "resume_strategist";
pub const INTERVIEW_PREPARER: &str = "interview_preparer";
pub const WORKSHOP_COACH: &str = "workshop_coach";

/// Capability profile a stage is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
    /// Tool keys this worker may use, if available at run time.
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    #[serde(alias = "description")]
    pub instructions: String,
    pub expected_output: String,
    #[serde(alias = "agent")]
    pub worker: String,
    /// Names of stages whose output this stage sees.
    #[serde(default)]
    pub context: Vec<String>,
    /// Extra tool keys on top of the worker's own.
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCatalogue {
    pub workers: BTreeMap<String, WorkerProfile>,
    /// Declaration order is preserved.
    pub stages: Vec<StageDefinition>,
}

impl StageCatalogue {
    pub fn builtin() -> Self {
        let artifact_tools = [
            READ_RESUME,
            SEMANTIC_SEARCH_RESUME,
            READ_WORKEXP,
            SEMANTIC_SEARCH_WORKEXP,
        ];
        let web_tools = [SCRAPE_TOOL, SEARCH_TOOL];
        let all_tools: Vec<&str> = web_tools.iter().chain(artifact_tools.iter()).copied().collect();

        let workers = BTreeMap::from([
            (
                RESEARCHER.to_string(),
                profile(RESEARCHER_ROLE, RESEARCHER_GOAL, RESEARCHER_BACKSTORY, &web_tools),
            ),
            (
                PROFILER.to_string(),
                profile(PROFILER_ROLE, PROFILER_GOAL, PROFILER_BACKSTORY, &all_tools),
            ),
            (
                RESUME_STRATEGIST.to_string(),
                profile(STRATEGIST_ROLE, STRATEGIST_GOAL, STRATEGIST_BACKSTORY, &all_tools),
            ),
            (
                INTERVIEW_PREPARER.to_string(),
                profile(INTERVIEW_ROLE, INTERVIEW_GOAL, INTERVIEW_BACKSTORY, &all_tools),
            ),
            (
                WORKSHOP_COACH.to_string(),
                profile(COACH_ROLE, COACH_GOAL, COACH_BACKSTORY, &all_tools),
            ),
        ]);

        let stages = vec![
            stage(RESEARCH_TASK, RESEARCH_INSTRUCTIONS, RESEARCH_EXPECTED, RESEARCHER, &[]),
            stage(PROFILE_TASK, PROFILE_INSTRUCTIONS, PROFILE_EXPECTED, PROFILER, &[]),
            stage(
                RESUME_STRATEGY_TASK,
                STRATEGY_INSTRUCTIONS,
                STRATEGY_EXPECTED,
                RESUME_STRATEGIST,
                &[RESEARCH_TASK, PROFILE_TASK],
            ),
            stage(
                INTERVIEW_PREPARATION_TASK,
                INTERVIEW_INSTRUCTIONS,
                QUESTIONS_EXPECTED,
                INTERVIEW_PREPARER,
                &[RESEARCH_TASK, PROFILE_TASK, RESUME_STRATEGY_TASK],
            ),
            stage(
                RESUME_WORKSHOP_QUESTIONS_TASK,
                WORKSHOP_INSTRUCTIONS,
                QUESTIONS_EXPECTED,
                WORKSHOP_COACH,
                &[],
            ),
        ];

        Self { workers, stages }
    }

    pub fn from_json_str(json: &str) -> Result<Self, StageConfigError> {
        let catalogue: Self = serde_json::from_str(json)?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    pub fn from_path(path: &Path) -> Result<Self, StageConfigError> {
        let json = std::fs::read_to_string(path)?;
        let catalogue = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            stages = catalogue.stages.len(),
            "loaded stage catalogue"
        );
        Ok(catalogue)
    }

    /// The override file when configured, otherwise the built-in catalogue.
    pub fn load(path: Option<&Path>) -> Result<Self, StageConfigError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Stage names are unique and every stage's worker exists.
    pub fn validate(&self) -> Result<(), StageConfigError> {
        let mut seen = HashSet::new();
        for def in &self.stages {
            if !seen.insert(def.name.as_str()) {
                return Err(StageConfigError::DuplicateStage(def.name.clone()));
            }
            if !self.workers.contains_key(&def.worker) {
                return Err(StageConfigError::UnknownWorker {
                    stage: def.name.clone(),
                    worker: def.worker.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn stage(&self, name: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerProfile> {
        self.workers.get(name)
    }
}

fn profile(role: &str, goal: &str, backstory: &str, tools: &[&str]) -> WorkerProfile {
    WorkerProfile {
        role: role.to_string(),
        goal: goal.to_string(),
        backstory: backstory.to_string(),
        tools: tools.iter().map(|t| t.to_string()).collect(),
    }
}

fn stage(
    name: &str,
    instructions: &str,
    expected_output: &str,
    worker: &str,
    context: &[&str],
) -> StageDefinition {
    StageDefinition {
        name: name.to_string(),
        instructions: instructions.to_string(),
        expected_output: expected_output.to_string(),
        worker: worker.to_string(),
        context: context.iter().map(|c| c.to_string()).collect(),
        tools: Vec::new(),
    }
}
