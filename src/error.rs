// src/error.rs
//! Typed failures for the generation pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Startup problems that stop generation before any AI call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found in '{}'. Please check the file.", path.display())]
    MissingCredential { path: PathBuf },

    #[error("Invalid language '{0}'. Please enter 'pt' or 'eng'.")]
    InvalidLanguage(String),

    #[error("Prompt fragment #{index} in {} is not a JSON object", path.display())]
    InvalidFragment { path: PathBuf, index: usize },

    #[error("Expected a JSON object in {}", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Expected a JSON array in {}", path.display())]
    NotAnArray { path: PathBuf },
}

/// Failures raised by a chat session while sending one turn.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Google API request limit reached. Please try again later.")]
    QuotaExhausted,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Chat response contained no text")]
    EmptyResponse,
}

/// A raw model answer that cannot be split into the three narrative fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} sections, found {found}")]
    SectionCount { expected: usize, found: usize },

    #[error("section {index} has no '<label>:' prefix")]
    MissingLabel { index: usize },

    #[error("section {index} is empty after its label")]
    EmptyField { index: usize },
}

/// Terminal outcomes of one resume-generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Could not obtain a well-formed answer after {attempts} attempts (last error: {last})")]
    Abandoned { attempts: u32, last: ParseError },

    #[error("Google API request limit reached. Please try again later.")]
    QuotaExhausted,

    #[error("Translation of the {field} field came back empty")]
    EmptyTranslation { field: &'static str },

    #[error(transparent)]
    Chat(ChatError),

    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl From<ChatError> for GenerationError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::QuotaExhausted => GenerationError::QuotaExhausted,
            other => GenerationError::Chat(other),
        }
    }
}

impl GenerationError {
    /// Failures that were handled where they happened and only need reporting.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            GenerationError::Abandoned { .. }
                | GenerationError::QuotaExhausted
                | GenerationError::EmptyTranslation { .. }
        )
    }
}
