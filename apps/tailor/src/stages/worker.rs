//! `Worker` backed by the LLM client, with a bounded tool-use loop.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_INSTRUCTION, TOOL_USE_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError, LlmResponse, Message, ToolResult, ToolSpec};
use crate::stages::{StageAssignment, Worker, WorkerError, WorkerProfile};

/// Model turns allowed per stage while tools are in play.
pub const MAX_TOOL_ROUNDS: u32 = 8;

pub struct LlmWorker {
    llm: LlmClient,
    max_tool_rounds: u32,
}

impl LlmWorker {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            max_tool_rounds: MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }
}

#[async_trait]
impl Worker for LlmWorker {
    async fn perform(&self, assignment: &StageAssignment) -> Result<String, WorkerError> {
        let system = system_prompt(&assignment.worker, !assignment.tools.is_empty());
        let prompt = stage_prompt(assignment);

        if assignment.tools.is_empty() {
            let response = self.llm.call(&prompt, &system).await?;
            return final_text(&response);
        }

        let specs: Vec<ToolSpec> = assignment
            .tools
            .names()
            .filter_map(|name| assignment.tools.get(name))
            .map(|tool| tool.spec())
            .collect();
        let mut messages = vec![Message::user_text(&prompt)];

        for round in 0..self.max_tool_rounds {
            let response = self.llm.send(&system, &messages, &specs).await?;
            if !response.wants_tools() {
                return final_text(&response);
            }

            messages.push(Message::assistant_blocks(&response.content));
            let mut results = Vec::new();
            for call in response.tool_uses() {
                debug!(stage = %assignment.stage, round, tool = call.name, "tool call");
                match assignment.tools.get(call.name) {
                    Some(tool) => {
                        let output = tool.invoke(call.input).await.map_err(|source| {
                            WorkerError::Tool {
                                tool: call.name.to_string(),
                                source,
                            }
                        })?;
                        results.push(ToolResult::ok(call.id, output));
                    }
                    None => {
                        warn!(stage = %assignment.stage, tool = call.name, "model asked for an unbound tool");
                        results.push(ToolResult::error(
                            call.id,
                            format!("Tool '{}' is not available.", call.name),
                        ));
                    }
                }
            }
            messages.push(Message::tool_results(results));
        }

        Err(WorkerError::ToolRoundsExceeded(self.max_tool_rounds))
    }
}

fn final_text(response: &LlmResponse) -> Result<String, WorkerError> {
    response
        .full_text()
        .filter(|t| !t.trim().is_empty())
        .ok_or(WorkerError::Llm(LlmError::EmptyContent))
}

pub fn system_prompt(worker: &WorkerProfile, has_tools: bool) -> String {
    let mut system = format!(
        "You are {}.\n{}\nYour personal goal is: {}\n\n{}",
        worker.role, worker.backstory, worker.goal, GROUNDING_INSTRUCTION
    );
    if has_tools {
        system.push_str("\n\n");
        system.push_str(TOOL_USE_INSTRUCTION);
    }
    system
}

pub fn stage_prompt(assignment: &StageAssignment) -> String {
    let mut prompt = format!("Current task: {}\n", assignment.instructions);

    if !assignment.context.is_empty() {
        prompt.push_str("\nThis is the context you're working with:\n");
        for ctx in &assignment.context {
            prompt.push_str(&format!("\n## Output of {}\n{}\n", ctx.stage, ctx.text));
        }
    }

    prompt.push_str(&format!(
        "\nThis is the expected criteria for your final answer: {}\n",
        assignment.expected_output
    ));
    if assignment.expected_output.contains("JSON") {
        prompt.push('\n');
        prompt.push_str(JSON_ONLY_INSTRUCTION);
        prompt.push('\n');
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{RuntimeInputs, StageOutput};
    use crate::tools::ToolRegistry;

    fn assignment(expected_output: &str, context: Vec<StageOutput>) -> StageAssignment {
        StageAssignment {
            stage: "resume_strategy_task".into(),
            worker: WorkerProfile {
                role: "Resume Strategist".into(),
                goal: "Tailor it".into(),
                backstory: "Seasoned recruiter.".into(),
                tools: vec![],
            },
            instructions: "Tailor the résumé for https://acme.dev/job".into(),
            expected_output: expected_output.into(),
            context,
            tools: ToolRegistry::new(),
            inputs: RuntimeInputs::new(),
        }
    }

    #[test]
    fn test_system_prompt_mentions_profile_and_tools() {
        let a = assignment("text", vec![]);
        let with_tools = system_prompt(&a.worker, true);
        assert!(with_tools.starts_with("You are Resume Strategist."));
        assert!(with_tools.contains("Your personal goal is: Tailor it"));
        assert!(with_tools.contains(TOOL_USE_INSTRUCTION));
        assert!(!system_prompt(&a.worker, false).contains(TOOL_USE_INSTRUCTION));
    }

    #[test]
    fn test_stage_prompt_includes_context_in_order() {
        let a = assignment(
            "A JSON object",
            vec![
                StageOutput {
                    stage: "research_task".into(),
                    text: "Needs Rust".into(),
                },
                StageOutput {
                    stage: "profile_task".into(),
                    text: "5 years backend".into(),
                },
            ],
        );
        let prompt = stage_prompt(&a);
        let research = prompt.find("## Output of research_task\nNeeds Rust").unwrap();
        let profile = prompt.find("## Output of profile_task\n5 years backend").unwrap();
        assert!(research < profile);
        assert!(prompt.contains("https://acme.dev/job"));
        assert!(prompt.contains(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_stage_prompt_without_context_or_json() {
        let prompt = stage_prompt(&assignment("A bulleted list", vec![]));
        assert!(!prompt.contains("context you're working with"));
        assert!(!prompt.contains(JSON_ONLY_INSTRUCTION));
    }
}
