// src/config.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FIELD_DECLARATION: &str =
    "Objetivo; Características Pessoais; Resumo das qualificações;";
pub const DEFAULT_TRANSLATION_PREFIX: &str =
    "Traduza para inglês sem mudar o formato, apenas traduza ";

/// Output language of the generated resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pt,
    Eng,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Pt, Language::Eng];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::Eng => "eng",
        }
    }

    /// English output is produced by translating the narrative
    pub fn needs_translation(&self) -> bool {
        matches!(self, Language::Eng)
    }
}

impl FromStr for Language {
    type Err = ConfigError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "pt" => Ok(Language::Pt),
            "eng" => Ok(Language::Eng),
            _ => Err(ConfigError::InvalidLanguage(input.trim().to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Template keys receiving the three narrative fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeKeys {
    pub objective: String,
    pub characteristics: String,
    pub qualifications: String,
}

impl NarrativeKeys {
    fn new(objective: &str, characteristics: &str, qualifications: &str) -> Self {
        Self {
            objective: objective.to_string(),
            characteristics: characteristics.to_string(),
            qualifications: qualifications.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeKeyConfig {
    pub pt: NarrativeKeys,
    pub eng: NarrativeKeys,
}

impl Default for NarrativeKeyConfig {
    fn default() -> Self {
        Self {
            pt: NarrativeKeys::new("objetivo", "pessoais", "resumo"),
            eng: NarrativeKeys::new("objective", "pessoais", "resumo"),
        }
    }
}

impl NarrativeKeyConfig {
    pub fn for_language(&self, lang: Language) -> &NarrativeKeys {
        match lang {
            Language::Pt => &self.pt,
            Language::Eng => &self.eng,
        }
    }
}

/// Sampling parameters forwarded to the model on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 0,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub data_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Defaults to `<data_dir>/secret.json`
    pub secrets_file: Option<PathBuf>,
    /// Defaults to `<data_dir>/prompt-parts.json`
    pub prompt_parts_file: Option<PathBuf>,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub retry_budget: u32,
    pub pacing_secs: u64,
    pub generation: GenerationParams,
    pub pdf_renderer: PathBuf,
    pub field_declaration: String,
    pub translation_prefix: String,
    pub narrative_keys: NarrativeKeyConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            templates_dir: PathBuf::from("template"),
            output_dir: PathBuf::from("output"),
            secrets_file: None,
            prompt_parts_file: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 120,
            retry_budget: 5,
            pacing_secs: 30,
            generation: GenerationParams::default(),
            pdf_renderer: PathBuf::from("wkhtmltopdf"),
            field_declaration: DEFAULT_FIELD_DECLARATION.to_string(),
            translation_prefix: DEFAULT_TRANSLATION_PREFIX.to_string(),
            narrative_keys: NarrativeKeyConfig::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = dir;
        self
    }

    pub fn with_templates_dir(mut self, dir: PathBuf) -> Self {
        self.templates_dir = dir;
        self
    }

    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn with_pacing_secs(mut self, secs: u64) -> Self {
        self.pacing_secs = secs;
        self
    }

    /// Make every relative path absolute against `root`
    pub fn resolve_paths(mut self, root: &Path) -> Self {
        self.data_dir = absolute_path(root, &self.data_dir);
        self.templates_dir = absolute_path(root, &self.templates_dir);
        self.output_dir = absolute_path(root, &self.output_dir);
        self.secrets_file = self.secrets_file.map(|p| absolute_path(root, &p));
        self.prompt_parts_file = self.prompt_parts_file.map(|p| absolute_path(root, &p));
        self
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.secrets_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("secret.json"))
    }

    pub fn prompt_parts_path(&self) -> PathBuf {
        self.prompt_parts_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("prompt-parts.json"))
    }

    pub fn personal_data_path(&self, lang: Language) -> PathBuf {
        self.data_dir.join(format!("data-{}.json", lang.code()))
    }

    pub fn narrative_keys_for(&self, lang: Language) -> &NarrativeKeys {
        self.narrative_keys.for_language(lang)
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_secs(self.pacing_secs)
    }
}

fn absolute_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
