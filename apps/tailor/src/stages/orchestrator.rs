//! Sequential execution of an `ExecutionPlan`.
//!
//! Each stage sees the runtime inputs plus the outputs of its context stages,
//! all of which ran earlier. The pipeline result is the last stage's output.
//! No stage is retried; the first failure aborts the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::errors::PipelineError;
use crate::llm_client::LlmError;
use crate::stages::{ExecutionPlan, PlannedStage, StageConfigError, WorkerProfile};
use crate::tools::{ToolError, ToolRegistry};

/// Global runtime inputs, e.g. `job_posting_url` and `personal_writeup`.
pub type RuntimeInputs = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error("tool use did not finish within {0} rounds")]
    ToolRoundsExceeded(u32),

    #[error("{0}")]
    Failed(String),
}

/// Output of a completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub stage: String,
    pub text: String,
}

/// Everything a worker needs to perform one stage, with placeholders filled.
#[derive(Debug, Clone)]
pub struct StageAssignment {
    pub stage: String,
    pub worker: WorkerProfile,
    pub instructions: String,
    pub expected_output: String,
    pub context: Vec<StageOutput>,
    pub tools: ToolRegistry,
    pub inputs: RuntimeInputs,
}

/// Executes one stage and returns free-form text.
#[async_trait]
pub trait Worker: Send + Sync {
    async fn perform(&self, assignment: &StageAssignment) -> Result<String, WorkerError>;
}

pub struct PipelineOrchestrator {
    worker: Arc<dyn Worker>,
}

impl PipelineOrchestrator {
    pub fn new(worker: Arc<dyn Worker>) -> Self {
        Self { worker }
    }

    pub async fn run(
        &self,
        plan: &ExecutionPlan,
        inputs: &RuntimeInputs,
    ) -> Result<String, PipelineError> {
        let total = plan.len();
        let mut outputs: Vec<StageOutput> = Vec::with_capacity(total);

        for (pos, step) in plan.steps().iter().enumerate() {
            let assignment = assign(step, &outputs, inputs);
            let span = info_span!("stage", name = %step.name(), step = pos + 1, of = total);

            let started = Instant::now();
            let text = self
                .worker
                .perform(&assignment)
                .instrument(span.clone())
                .await
                .map_err(|source| PipelineError::Generation {
                    stage: step.name().to_string(),
                    source,
                })?;

            span.in_scope(|| {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    chars = text.len(),
                    "stage completed"
                )
            });
            outputs.push(StageOutput {
                stage: step.name().to_string(),
                text,
            });
        }

        outputs
            .pop()
            .map(|last| last.text)
            .ok_or(PipelineError::StageConfiguration(StageConfigError::EmptySelection))
    }
}

fn assign(step: &PlannedStage, outputs: &[StageOutput], inputs: &RuntimeInputs) -> StageAssignment {
    let node = &step.node;
    StageAssignment {
        stage: node.name.clone(),
        worker: WorkerProfile {
            role: interpolate(&node.worker.role, inputs),
            goal: interpolate(&node.worker.goal, inputs),
            backstory: interpolate(&node.worker.backstory, inputs),
            tools: node.worker.tools.clone(),
        },
        instructions: interpolate(&node.instructions, inputs),
        expected_output: interpolate(&node.expected_output, inputs),
        context: step
            .context
            .iter()
            .filter_map(|&pos| outputs.get(pos).cloned())
            .collect(),
        tools: node.tools.clone(),
        inputs: inputs.clone(),
    }
}

/// Replaces `{key}` with `inputs[key]` in one pass. Unknown keys and braces
/// that do not enclose an identifier are left as written.
pub fn interpolate(template: &str, inputs: &RuntimeInputs) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let key_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let key = &after[..key_len];

        match inputs.get(key) {
            Some(value) if !key.is_empty() && after[key_len..].starts_with('}') => {
                out.push_str(value);
                rest = &after[key_len + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{StageCatalogue, TaskGraph};
    use std::sync::Mutex;

    fn inputs(pairs: &[(&str, &str)]) -> RuntimeInputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Echoes the stage name and the context it saw; records every assignment.
    #[derive(Default)]
    struct EchoWorker {
        seen: Mutex<Vec<StageAssignment>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Worker for EchoWorker {
        async fn perform(&self, assignment: &StageAssignment) -> Result<String, WorkerError> {
            self.seen.lock().unwrap().push(assignment.clone());
            if self.fail_on == Some(assignment.stage.as_str()) {
                return Err(WorkerError::Failed("worker crashed".into()));
            }
            let ctx: Vec<&str> = assignment.context.iter().map(|c| c.text.as_str()).collect();
            Ok(format!("{}<-[{}]", assignment.stage, ctx.join(",")))
        }
    }

    fn catalogue_ab() -> StageCatalogue {
        StageCatalogue::from_json_str(
            r#"{"workers": {"w": {"role": "R for {job_posting_url}", "goal": "G"}},
                "stages": [
                  {"name": "A", "instructions": "look at {job_posting_url}", "expected_output": "x", "worker": "w"},
                  {"name": "B", "instructions": "use {missing}", "expected_output": "{\"k\": 1}", "worker": "w", "context": ["A"]}
                ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_interpolate() {
        let vars = inputs(&[("job_posting_url", "https://acme.dev/job"), ("empty", "")]);
        assert_eq!(
            interpolate("see {job_posting_url}!", &vars),
            "see https://acme.dev/job!"
        );
        assert_eq!(interpolate("{unknown} stays", &vars), "{unknown} stays");
        assert_eq!(interpolate(r#"{"a": {empty}}"#, &vars), r#"{"a": }"#);
        assert_eq!(interpolate("{ job_posting_url }", &vars), "{ job_posting_url }");
        assert_eq!(interpolate("trailing {", &vars), "trailing {");
        assert_eq!(interpolate("{}", &vars), "{}");
    }

    #[test]
    fn test_interpolate_is_single_pass() {
        let vars = inputs(&[("a", "{b}"), ("b", "x")]);
        assert_eq!(interpolate("{a}", &vars), "{b}");
    }

    #[tokio::test]
    async fn test_context_output_reaches_dependent_stage() {
        let graph = TaskGraph::build(&catalogue_ab(), &ToolRegistry::new()).unwrap();
        let plan = graph.select(&["A", "B"]).unwrap();
        let worker = Arc::new(EchoWorker::default());
        let orchestrator = PipelineOrchestrator::new(worker.clone());

        let vars = inputs(&[("job_posting_url", "https://acme.dev/job")]);
        let result = orchestrator.run(&plan, &vars).await.unwrap();

        assert_eq!(result, "B<-[A<-[]]");
        let seen = worker.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].instructions, "look at https://acme.dev/job");
        assert_eq!(seen[0].worker.role, "R for https://acme.dev/job");
        assert_eq!(seen[1].instructions, "use {missing}");
        assert_eq!(seen[1].expected_output, "{\"k\": 1}");
        assert_eq!(
            seen[1].context,
            vec![StageOutput {
                stage: "A".into(),
                text: "A<-[]".into()
            }]
        );
        assert_eq!(seen[1].inputs, vars);
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_stages() {
        let graph = TaskGraph::build(&catalogue_ab(), &ToolRegistry::new()).unwrap();
        let plan = graph.select(&["A", "B"]).unwrap();
        let worker = Arc::new(EchoWorker {
            fail_on: Some("A"),
            ..Default::default()
        });
        let orchestrator = PipelineOrchestrator::new(worker.clone());

        let err = orchestrator.run(&plan, &RuntimeInputs::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation { ref stage, .. } if stage == "A"));
        assert_eq!(worker.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_builtin_tailor_order_runs_three_stages() {
        let graph = TaskGraph::build(&StageCatalogue::builtin(), &ToolRegistry::new()).unwrap();
        let plan = graph
            .select(&["research_task", "profile_task", "resume_strategy_task"])
            .unwrap();
        let worker = Arc::new(EchoWorker::default());
        let result = PipelineOrchestrator::new(worker.clone())
            .run(&plan, &RuntimeInputs::new())
            .await
            .unwrap();
        assert_eq!(
            result,
            "resume_strategy_task<-[research_task<-[],profile_task<-[]]"
        );
    }
}
