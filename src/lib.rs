//! Resume generator: personal data plus an AI-written narrative, filled into
//! an HTML template and rendered to PDF in Portuguese or English.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod pacing;
pub mod pdf;
pub mod prompt;
pub mod response_parser;
pub mod types;
pub mod utils;

pub use config::{GeneratorConfig, Language};
pub use error::{ChatError, ConfigError, GenerationError, ParseError};
pub use generator::{GenerationReport, GenerationState, ResumeGenerator};
