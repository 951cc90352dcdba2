// src/prompt.rs
//! Builds the flat line sequence sent to the model as one turn

use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use crate::core::FsOps;
use crate::error::ConfigError;
use crate::types::PersonalData;

pub const INPUT_PREFIX: &str = "input: ";
pub const DESCRIPTION_PREFIX: &str = "DESCRICAO: ";
pub const PERSONAL_PREFIX: &str = "PESSOAL: ";
pub const FIELDS_PREFIX: &str = "CAMPOS: ";
pub const OUTPUT_MARKER: &str = "output: ";

/// Static guidance injected into every generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFragment {
    pub label: String,
    pub text: String,
}

impl PromptFragment {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.label, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    lines: Vec<String>,
}

impl AssembledPrompt {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Load fragments from a JSON array of `{label: text}` objects, in file order
pub async fn load_fragments(path: &Path) -> Result<Vec<PromptFragment>> {
    let value: Value = FsOps::read_json(path).await?;
    let fragments = fragments_from_value(path, value)?;
    debug!("Loaded {} prompt fragments", fragments.len());
    Ok(fragments)
}

fn fragments_from_value(path: &Path, value: Value) -> Result<Vec<PromptFragment>, ConfigError> {
    let Value::Array(entries) = value else {
        return Err(ConfigError::NotAnArray {
            path: path.to_path_buf(),
        });
    };

    let mut fragments = Vec::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(map) = entry else {
            return Err(ConfigError::InvalidFragment {
                path: path.to_path_buf(),
                index,
            });
        };
        for (label, text) in map {
            let text = match text {
                Value::String(s) => s,
                other => other.to_string(),
            };
            fragments.push(PromptFragment { label, text });
        }
    }
    Ok(fragments)
}

pub fn assemble_prompt(
    fragments: &[PromptFragment],
    job: &JobPosting,
    personal: &PersonalData,
    field_declaration: &str,
) -> AssembledPrompt {
    let mut lines: Vec<String> = fragments.iter().map(PromptFragment::render).collect();
    lines.push(format!("{}{}", INPUT_PREFIX, job.title));
    lines.push(format!("{}{}", DESCRIPTION_PREFIX, job.description));
    lines.push(format!("{}{}", PERSONAL_PREFIX, personal.to_prompt_string()));
    lines.push(format!("{}{}", FIELDS_PREFIX, field_declaration));
    lines.push(OUTPUT_MARKER.to_string());
    AssembledPrompt { lines }
}
