//! Output parsing — pulls a JSON payload out of free-form generated text and
//! validates it against the expected schema.
//!
//! Extraction is a heuristic (fenced blocks are unwrapped, anything else is
//! passed through); validation is strict. A payload that is not JSON, or does not
//! match the schema, is an error and is never repaired.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::models::resume::TailoredResume;
use crate::models::workshop::QuestionList;

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

#[derive(Debug, Error)]
pub enum OutputParseError {
    #[error("generated output is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("generated output does not match the {schema} schema: {source}")]
    Schema {
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Returns the JSON body of a fenced block, or the trimmed text unchanged.
///
/// Inside a fence, the first segment that is a bare `{...}` object, or `json`
/// followed by one, wins.
pub fn extract_json(raw: &str) -> &str {
    let text = raw.trim();

    if text.starts_with(FENCE) {
        for part in text.split(FENCE).map(str::trim) {
            if is_object_literal(part) {
                return part;
            }
            if let Some(body) = part.strip_prefix(JSON_TAG).map(str::trim) {
                if is_object_literal(body) {
                    return body;
                }
            }
        }
    }

    text
}

pub fn parse_resume(json: &str) -> Result<TailoredResume, OutputParseError> {
    parse_schema(json, "tailored resume")
}

pub fn parse_questions(json: &str) -> Result<QuestionList, OutputParseError> {
    parse_schema(json, "question list")
}

fn parse_schema<T: DeserializeOwned>(json: &str, schema: &'static str) -> Result<T, OutputParseError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
        warn!(
            schema,
            error = %e,
            preview = %preview(json),
            "generated output is not JSON"
        );
        OutputParseError::Syntax(e)
    })?;

    serde_json::from_value(value).map_err(|source| {
        warn!(schema, error = %source, "generated output failed schema validation");
        OutputParseError::Schema { schema, source }
    })
}

fn is_object_literal(s: &str) -> bool {
    s.starts_with('{') && s.ends_with('}')
}

fn preview(s: &str) -> String {
    s.chars().take(120).collect()
}
