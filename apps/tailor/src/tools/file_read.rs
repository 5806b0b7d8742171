use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolError};
use crate::workspace::{ArtifactKind, WorkspaceArtifact};

/// Returns the full text of one workspace artifact. Takes no input.
pub struct ArtifactReadTool {
    name: &'static str,
    description: String,
    artifact: WorkspaceArtifact,
}

impl ArtifactReadTool {
    pub fn new(name: &'static str, artifact: WorkspaceArtifact) -> Self {
        let what = match artifact.kind {
            ArtifactKind::ResumeText => "the candidate's current résumé",
            ArtifactKind::WorkExperience => "the candidate's own work-experience notes",
        };
        Self {
            name,
            description: format!("Reads the full text of {what}."),
            artifact,
        }
    }
}

#[async_trait]
impl Tool for ArtifactReadTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    async fn invoke(&self, _input: &Value) -> Result<String, ToolError> {
        Ok(self.artifact.read_to_string().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::EphemeralWorkspace;

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let ws = EphemeralWorkspace::create(Some("notes"), None).unwrap();
        let mut artifact = ws.artifact(ArtifactKind::WorkExperience).unwrap().clone();
        artifact.path = ws.path().join("gone.mdx");
        let tool = ArtifactReadTool::new("read_workexp", artifact);
        assert!(matches!(
            tool.invoke(&Value::Null).await,
            Err(ToolError::Io(_))
        ));
        assert!(tool.description().contains("work-experience"));
    }
}
