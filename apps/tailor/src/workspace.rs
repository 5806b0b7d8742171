//! Ephemeral workspace — a private temp directory holding the text artifacts that
//! stage tooling reads.
//!
//! The directory is owned by a `tempfile::TempDir`, so it is removed when the
//! workspace is dropped on every exit path: normal return, `?` propagation and
//! panic unwinding alike. `close()` exists to surface removal errors explicitly.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

const WORKSPACE_PREFIX: &str = "tailor-ws-";

/// The two kinds of artifact a workspace can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ResumeText,
    WorkExperience,
}

impl ArtifactKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::ResumeText => "resume_text.mdx",
            ArtifactKind::WorkExperience => "work_experience.mdx",
        }
    }
}

/// A named text blob materialized inside a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl WorkspaceArtifact {
    pub async fn read_to_string(&self) -> io::Result<String> {
        tokio::fs::read_to_string(&self.path).await
    }
}

#[derive(Debug)]
pub struct EphemeralWorkspace {
    dir: TempDir,
    resume_text: Option<WorkspaceArtifact>,
    work_experience: Option<WorkspaceArtifact>,
}

impl EphemeralWorkspace {
    /// Creates a uniquely named staging directory and writes at most two artifacts.
    /// An absent input produces no artifact at all.
    pub fn create(work_experience: Option<&str>, resume_text: Option<&str>) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(WORKSPACE_PREFIX).tempdir()?;

        let resume_text = resume_text
            .map(|text| write_artifact(dir.path(), ArtifactKind::ResumeText, text))
            .transpose()?;
        let work_experience = work_experience
            .map(|text| write_artifact(dir.path(), ArtifactKind::WorkExperience, text))
            .transpose()?;

        debug!(
            path = %dir.path().display(),
            resume = resume_text.is_some(),
            work_experience = work_experience.is_some(),
            "workspace created"
        );

        Ok(Self {
            dir,
            resume_text,
            work_experience,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&WorkspaceArtifact> {
        match kind {
            ArtifactKind::ResumeText => self.resume_text.as_ref(),
            ArtifactKind::WorkExperience => self.work_experience.as_ref(),
        }
    }

    pub fn artifacts(&self) -> impl Iterator<Item = &WorkspaceArtifact> {
        self.resume_text.iter().chain(self.work_experience.iter())
    }

    /// Removes the directory now. Dropping the workspace does the same but
    /// swallows the error; this logs it and hands it back.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "workspace cleanup failed");
        })?;
        debug!(path = %path.display(), "workspace removed");
        Ok(())
    }
}

fn write_artifact(root: &Path, kind: ArtifactKind, text: &str) -> io::Result<WorkspaceArtifact> {
    let path = root.join(kind.file_name());
    std::fs::write(&path, text)?;
    Ok(WorkspaceArtifact { kind, path })
}
