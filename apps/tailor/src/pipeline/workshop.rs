//! Question-producing modes: résumé workshop and interview prep.

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::extraction::UploadedFile;
use crate::models::workshop::{WorkshopContext, WorkshopResult};
use crate::output::{extract_json, parse_questions};
use crate::pipeline::{PipelineContext, PipelineMode, WORKSHOP_FOCUS};

pub async fn run_workshop_pipeline(
    ctx: &PipelineContext,
    workshop_focus: Option<&str>,
    job_link: Option<&str>,
    work_experience: Option<&str>,
    resume: Option<&UploadedFile>,
) -> Result<WorkshopResult, PipelineError> {
    let mode = PipelineMode::Workshop;
    let run_id = Uuid::new_v4();
    let span = info_span!("pipeline", %run_id, mode = mode.as_str());

    async move {
        let writeup = ctx.effective_writeup(work_experience);
        let mut inputs = ctx.base_inputs(job_link.unwrap_or_default(), &writeup);
        inputs.insert(
            WORKSHOP_FOCUS.to_string(),
            workshop_focus.unwrap_or_default().to_string(),
        );

        let questions = generate_questions(ctx, mode, &writeup, resume, inputs).await?;
        Ok(WorkshopResult {
            questions,
            context: WorkshopContext {
                resume_name: resume.and_then(|r| r.name.clone()),
                workshop_focus: workshop_focus.map(str::to_string),
                job_link: job_link.map(str::to_string),
                has_extra_notes: !writeup.trim().is_empty(),
            },
        })
    }
    .instrument(span)
    .await
}

/// Runs the tailoring stages followed by interview preparation.
/// `topic` is the job posting reference, as in tailoring mode.
pub async fn run_interview_prep_pipeline(
    ctx: &PipelineContext,
    topic: &str,
    work_experience: Option<&str>,
    resume: Option<&UploadedFile>,
) -> Result<WorkshopResult, PipelineError> {
    let mode = PipelineMode::InterviewPrep;
    let run_id = Uuid::new_v4();
    let span = info_span!("pipeline", %run_id, mode = mode.as_str());

    async move {
        let writeup = ctx.effective_writeup(work_experience);
        let inputs = ctx.base_inputs(topic, &writeup);

        let questions = generate_questions(ctx, mode, &writeup, resume, inputs).await?;
        Ok(WorkshopResult {
            questions,
            context: WorkshopContext {
                resume_name: resume.and_then(|r| r.name.clone()),
                workshop_focus: None,
                job_link: Some(topic.to_string()),
                has_extra_notes: !writeup.trim().is_empty(),
            },
        })
    }
    .instrument(span)
    .await
}

async fn generate_questions(
    ctx: &PipelineContext,
    mode: PipelineMode,
    writeup: &str,
    resume: Option<&UploadedFile>,
    inputs: crate::stages::RuntimeInputs,
) -> Result<Vec<String>, PipelineError> {
    info!(has_resume = resume.is_some(), "question run started");
    let raw = ctx.generate(mode, writeup, resume, inputs).await?;
    let questions = parse_questions(extract_json(&raw))?.into_questions();
    info!(count = questions.len(), "question run finished");
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedWorker;
    use crate::pipeline::{JOB_POSTING_URL, PERSONAL_WRITEUP};
    use crate::stages::{
        StageCatalogue, INTERVIEW_PREPARATION_TASK, PROFILE_TASK, RESEARCH_TASK,
        RESUME_STRATEGY_TASK, RESUME_WORKSHOP_QUESTIONS_TASK,
    };
    use crate::tools::READ_RESUME;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_workshop_returns_questions_and_context() {
        let worker = Arc::new(ScriptedWorker::new(&[(
            RESUME_WORKSHOP_QUESTIONS_TASK,
            "```json\n{\"questions\": [\"Q1\", \"Q2\"]}\n```",
        )]));
        let ctx = PipelineContext::new(worker.clone(), StageCatalogue::builtin());
        let upload = UploadedFile::new(
            b"Sam Lee".to_vec(),
            Some("text/plain".into()),
            Some("cv.txt".into()),
        );

        let result = run_workshop_pipeline(
            &ctx,
            Some("quantify impact"),
            Some("https://acme.dev/job"),
            None,
            Some(&upload),
        )
        .await
        .unwrap();

        assert_eq!(result.questions, vec!["Q1", "Q2"]);
        assert_eq!(result.context.resume_name.as_deref(), Some("cv.txt"));
        assert_eq!(result.context.workshop_focus.as_deref(), Some("quantify impact"));
        assert_eq!(result.context.job_link.as_deref(), Some("https://acme.dev/job"));
        assert!(!result.context.has_extra_notes);

        assert_eq!(worker.stages_run(), vec![RESUME_WORKSHOP_QUESTIONS_TASK]);
        let seen = worker.seen.lock().unwrap();
        assert!(seen[0].instructions.contains("quantify impact"));
        assert_eq!(seen[0].inputs[JOB_POSTING_URL], "https://acme.dev/job");
        assert!(seen[0].tools.contains(READ_RESUME));
    }

    #[tokio::test]
    async fn test_workshop_falls_back_to_configured_writeup() {
        let worker = Arc::new(ScriptedWorker::new(&[(
            RESUME_WORKSHOP_QUESTIONS_TASK,
            r#"{"questions": null}"#,
        )]));
        let ctx = PipelineContext::new(worker.clone(), StageCatalogue::builtin())
            .with_personal_writeup("Led the payments team");

        let result = run_workshop_pipeline(&ctx, None, None, None, None)
            .await
            .unwrap();

        assert!(result.questions.is_empty());
        assert!(result.context.has_extra_notes);
        assert_eq!(result.context.resume_name, None);
        let seen = worker.seen.lock().unwrap();
        assert_eq!(seen[0].inputs[PERSONAL_WRITEUP], "Led the payments team");
        assert_eq!(seen[0].inputs[JOB_POSTING_URL], "");
    }

    #[tokio::test]
    async fn test_workshop_rejects_wrongly_typed_questions() {
        let worker = Arc::new(ScriptedWorker::new(&[(
            RESUME_WORKSHOP_QUESTIONS_TASK,
            r#"{"questions": "just one"}"#,
        )]));
        let ctx = PipelineContext::new(worker, StageCatalogue::builtin());
        let err = run_workshop_pipeline(&ctx, None, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::OutputParse(_)));
    }

    #[tokio::test]
    async fn test_interview_prep_runs_four_stages() {
        let worker = Arc::new(ScriptedWorker::new(&[
            (RESEARCH_TASK, "reqs"),
            (PROFILE_TASK, "profile"),
            (RESUME_STRATEGY_TASK, "{}"),
            (
                INTERVIEW_PREPARATION_TASK,
                "```\n{\"questions\": [\"Tell me about Initech\"]}\n```",
            ),
        ]));
        let ctx = PipelineContext::new(worker.clone(), StageCatalogue::builtin());

        let result = run_interview_prep_pipeline(&ctx, "Acme SWE job", Some("5 years backend"), None)
            .await
            .unwrap();

        assert_eq!(result.questions, vec!["Tell me about Initech"]);
        assert_eq!(result.context.job_link.as_deref(), Some("Acme SWE job"));
        assert!(result.context.has_extra_notes);
        assert_eq!(worker.stages_run().len(), 4);
        let seen = worker.seen.lock().unwrap();
        assert_eq!(seen[3].context.len(), 3);
    }
}
