//! Passage lookup over a workspace artifact.
//!
//! Text is split into paragraph chunks (blank-line separated, falling back to
//! lines for single-paragraph text) and ranked by how many distinct query terms
//! each chunk contains. Ties keep document order.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{string_arg, string_schema, Tool, ToolError};
use crate::workspace::{ArtifactKind, WorkspaceArtifact};

pub const TOP_PASSAGES: usize = 3;
const QUERY_FIELD: &str = "search_query";
const NO_MATCH: &str = "No relevant passages found.";

pub struct ArtifactSearchTool {
    name: &'static str,
    description: String,
    artifact: WorkspaceArtifact,
}

impl ArtifactSearchTool {
    pub fn new(name: &'static str, artifact: WorkspaceArtifact) -> Self {
        let what = match artifact.kind {
            ArtifactKind::ResumeText => "the candidate's current résumé",
            ArtifactKind::WorkExperience => "the candidate's work-experience notes",
        };
        Self {
            name,
            description: format!(
                "Finds the passages of {what} most relevant to a search query."
            ),
            artifact,
        }
    }
}

#[async_trait]
impl Tool for ArtifactSearchTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        string_schema(QUERY_FIELD, "What to look for")
    }

    async fn invoke(&self, input: &Value) -> Result<String, ToolError> {
        let query = string_arg(input, QUERY_FIELD)?;
        let text = self.artifact.read_to_string().await?;
        let passages = rank_passages(&text, query, TOP_PASSAGES);
        if passages.is_empty() {
            return Ok(NO_MATCH.to_string());
        }
        Ok(passages.join("\n---\n"))
    }
}

/// Returns up to `top_k` chunks of `text` sharing at least one term with `query`.
pub fn rank_passages<'a>(text: &'a str, query: &str, top_k: usize) -> Vec<&'a str> {
    let query_terms: HashSet<String> = terms(query).collect();
    if query_terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, usize, &str)> = chunks(text)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, chunk)| {
            let chunk_terms: HashSet<String> = terms(chunk).collect();
            let score = query_terms.intersection(&chunk_terms).count();
            (score > 0).then_some((score, idx, chunk))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().take(top_k).map(|(_, _, c)| c).collect()
}

fn chunks(text: &str) -> Vec<&str> {
    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.len() > 1 {
        return paragraphs;
    }
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
}
