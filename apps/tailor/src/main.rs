use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tailor::config::Config;
use tailor::models::resume::DEFAULT_FILENAME_STEM;
use tailor::{llm_client, PipelineContext, PipelineError, UploadedFile};

/// Tailor a résumé to a job posting, or generate workshop / interview questions.
#[derive(Parser, Debug)]
#[command(name = "tailor", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce a tailored résumé PDF
    Tailor {
        /// Job posting URL or description
        #[arg(long)]
        topic: String,

        #[command(flatten)]
        material: Material,

        /// Directory to write the PDF into
        #[arg(long, value_name = "DIR", default_value = ".")]
        out: PathBuf,
    },

    /// Generate résumé workshop questions
    Workshop {
        /// What the workshop should focus on
        #[arg(long)]
        focus: Option<String>,

        /// Job posting URL
        #[arg(long)]
        job_link: Option<String>,

        #[command(flatten)]
        material: Material,
    },

    /// Generate interview preparation questions
    Interview {
        /// Job posting URL or description
        #[arg(long)]
        topic: String,

        #[command(flatten)]
        material: Material,
    },
}

#[derive(clap::Args, Debug)]
struct Material {
    /// Work-experience notes, or @path to read them from a file
    #[arg(long, value_name = "TEXT|@FILE")]
    work_experience: Option<String>,

    /// Current résumé (PDF or plain text)
    #[arg(long, value_name = "PATH")]
    resume: Option<PathBuf>,
}

impl Material {
    fn work_experience(&self) -> Result<Option<String>> {
        match self.work_experience.as_deref() {
            Some(arg) => match arg.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)
                    .map(Some)
                    .with_context(|| format!("Failed to read work experience from '{path}'")),
                None => Ok(Some(arg.to_string())),
            },
            None => Ok(None),
        }
    }

    fn resume(&self) -> Result<Option<UploadedFile>> {
        self.resume.as_deref().map(load_upload).transpose()
    }
}

fn load_upload(path: &Path) -> Result<UploadedFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read résumé '{}'", path.display()))?;
    let media_type = mime_guess::from_path(path).first().map(|m| m.to_string());
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    Ok(UploadedFile::new(bytes, media_type, name))
}

/// Joins the suggested filename onto `out`. The name comes from a generated
/// headline, so separators are flattened and anything still able to leave
/// `out` falls back to the default name.
fn output_path(out: &Path, filename: &str) -> PathBuf {
    let flat = filename.replace(['/', '\\'], "_");
    if flat.contains("..") || flat.trim_end_matches(".pdf").trim().is_empty() {
        return out.join(format!("{DEFAULT_FILENAME_STEM}.pdf"));
    }
    out.join(flat)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting tailor v{} (model: {})",
        env!("CARGO_PKG_VERSION"),
        llm_client::MODEL
    );

    let ctx = PipelineContext::from_config(&config)?;

    if let Err(e) = run(&ctx, args.command).await {
        match e.downcast_ref::<PipelineError>() {
            Some(pipeline_err) => {
                error!(code = pipeline_err.code(), "pipeline failed");
                anyhow::bail!("{}", pipeline_err.user_message());
            }
            None => return Err(e),
        }
    }
    Ok(())
}

async fn run(ctx: &PipelineContext, command: Command) -> Result<()> {
    match command {
        Command::Tailor {
            topic,
            material,
            out,
        } => {
            let work_experience = material.work_experience()?;
            let resume = material.resume()?;
            let doc = tailor::run_tailor_pipeline(
                ctx,
                &topic,
                work_experience.as_deref(),
                resume.as_ref(),
            )
            .await?;

            let path = output_path(&out, &doc.filename);
            tokio::fs::write(&path, &doc.pdf_bytes)
                .await
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!("Wrote {}", path.display());
            println!("{}", path.display());
        }
        Command::Workshop {
            focus,
            job_link,
            material,
        } => {
            let work_experience = material.work_experience()?;
            let resume = material.resume()?;
            let result = tailor::run_workshop_pipeline(
                ctx,
                focus.as_deref(),
                job_link.as_deref(),
                work_experience.as_deref(),
                resume.as_ref(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Interview { topic, material } => {
            let work_experience = material.work_experience()?;
            let resume = material.resume()?;
            let result = tailor::run_interview_prep_pipeline(
                ctx,
                &topic,
                work_experience.as_deref(),
                resume.as_ref(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
