// Tool capabilities exposed to stage workers by name.
//
// The registry is the set of tools actually available for one run. Stage
// definitions ask for tools by key; the graph builder binds only the keys
// present here.

pub mod artifact_search;
pub mod file_read;
pub mod web;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::ToolSpec;
use crate::workspace::{ArtifactKind, EphemeralWorkspace};

pub use artifact_search::ArtifactSearchTool;
pub use file_read::ArtifactReadTool;
pub use web::{ScrapeTool, SerperSearchTool};

pub const READ_RESUME: &str = "read_resume";
pub const SEMANTIC_SEARCH_RESUME: &str = "semantic_search_resume";
pub const READ_WORKEXP: &str = "read_workexp";
pub const SEMANTIC_SEARCH_WORKEXP: &str = "semantic_search_workexp";
pub const SEARCH_TOOL: &str = "search_tool";
pub const SCRAPE_TOOL: &str = "scrape_tool";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid tool input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Upstream { status: u16 },
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the tool input object.
    fn input_schema(&self) -> Value;

    async fn invoke(&self, input: &Value) -> Result<String, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Reads a required string field out of a tool input object.
pub(crate) fn string_arg<'a>(input: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing string field '{key}'")))
}

/// Single-string-field object schema.
pub(crate) fn string_schema(key: &str, description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": { key: { "type": "string", "description": description } },
        "required": [key],
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Stable tool key → implementation.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.tools.keys()).finish()
    }
}

/// Builds the tools available for one run.
///
/// Web scraping is always present; web search needs a Serper key. Artifact
/// tools exist only for artifacts the workspace actually holds.
pub fn build_registry(
    workspace: &EphemeralWorkspace,
    http: &reqwest::Client,
    serper_api_key: Option<&str>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(ScrapeTool::new(http.clone())));
    if let Some(key) = serper_api_key {
        registry.register(Arc::new(SerperSearchTool::new(http.clone(), key.to_string())));
    }

    if let Some(artifact) = workspace.artifact(ArtifactKind::ResumeText) {
        registry.register(Arc::new(ArtifactReadTool::new(READ_RESUME, artifact.clone())));
        registry.register(Arc::new(ArtifactSearchTool::new(
            SEMANTIC_SEARCH_RESUME,
            artifact.clone(),
        )));
    }
    if let Some(artifact) = workspace.artifact(ArtifactKind::WorkExperience) {
        registry.register(Arc::new(ArtifactReadTool::new(READ_WORKEXP, artifact.clone())));
        registry.register(Arc::new(ArtifactSearchTool::new(
            SEMANTIC_SEARCH_WORKEXP,
            artifact.clone(),
        )));
    }

    debug!(tools = ?registry, "tool registry built");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_without_artifacts_or_serper() {
        let ws = EphemeralWorkspace::create(None, None).unwrap();
        let registry = build_registry(&ws, &reqwest::Client::new(), None);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![SCRAPE_TOOL]);
    }

    #[test]
    fn test_registry_binds_present_artifacts_only() {
        let ws = EphemeralWorkspace::create(Some("5 years backend"), None).unwrap();
        let registry = build_registry(&ws, &reqwest::Client::new(), Some("key"));
        assert!(registry.contains(READ_WORKEXP));
        assert!(registry.contains(SEMANTIC_SEARCH_WORKEXP));
        assert!(registry.contains(SEARCH_TOOL));
        assert!(!registry.contains(READ_RESUME));
        assert!(!registry.contains(SEMANTIC_SEARCH_RESUME));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_string_arg() {
        let input = json!({"search_query": "  rust  ", "n": 3});
        assert_eq!(string_arg(&input, "search_query").unwrap(), "rust");
        assert!(matches!(string_arg(&input, "n"), Err(ToolError::InvalidInput(_))));
        assert!(string_arg(&json!({"search_query": " "}), "search_query").is_err());
    }

    #[tokio::test]
    async fn test_registered_read_tool_reads_artifact() {
        let ws = EphemeralWorkspace::create(None, Some("Jane Doe\nRust")).unwrap();
        let registry = build_registry(&ws, &reqwest::Client::new(), None);
        let tool = registry.get(READ_RESUME).unwrap();
        assert_eq!(tool.invoke(&json!({})).await.unwrap(), "Jane Doe\nRust");
        assert_eq!(tool.spec().name, READ_RESUME);
    }
}
