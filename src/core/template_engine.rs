// src/core/template_engine.rs
//! Placeholder substitution for the per-language HTML templates

use anyhow::Result;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

use crate::config::Language;
use crate::core::FsOps;

pub struct TemplateEngine {
    templates_dir: PathBuf,
}

impl TemplateEngine {
    pub fn new(templates_dir: PathBuf) -> Self {
        Self { templates_dir }
    }

    pub fn templates_dir(&self) -> &PathBuf {
        &self.templates_dir
    }

    pub fn template_path(&self, lang: Language) -> PathBuf {
        self.templates_dir
            .join(format!("template-{}.html", lang.code()))
    }

    pub async fn load_template(&self, lang: Language) -> Result<String> {
        FsOps::read_file_safe(&self.template_path(lang)).await
    }

    /// Load the language template and fill it in one pass
    pub async fn render(&self, lang: Language, data: &Map<String, Value>) -> Result<String> {
        let template = self.load_template(lang).await?;
        let filled = Self::fill_template(&template, data);
        debug!(
            "Filled {} with {} top-level keys",
            self.template_path(lang).display(),
            data.len()
        );
        Ok(filled)
    }

    // ===== Variable Processing =====

    /// Replace `{key}`, `{key.inner}` and `{key[i]}` placeholders that have data.
    ///
    /// Placeholders without a matching entry are left verbatim, so a template
    /// can be filled progressively over several passes.
    pub fn fill_template(template: &str, data: &Map<String, Value>) -> String {
        let mut result = template.to_string();
        for (key, value) in data {
            match value {
                Value::Object(inner) => {
                    for (inner_key, inner_value) in inner {
                        let placeholder = format!("{{{}.{}}}", key, inner_key);
                        result = result.replace(&placeholder, &value_to_text(inner_value));
                    }
                }
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let placeholder = format!("{{{}[{}]}}", key, index);
                        result = result.replace(&placeholder, &value_to_text(item));
                    }
                }
                scalar => {
                    let placeholder = format!("{{{}}}", key);
                    result = result.replace(&placeholder, &value_to_text(scalar));
                }
            }
        }
        result
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
