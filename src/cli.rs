// src/cli.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::info;

use crate::config::Language;
use crate::prompt::JobPosting;

pub const LANGUAGE_QUESTION: &str = "Enter desired language (pt for Portuguese, eng for English): ";
pub const TITLE_QUESTION: &str = "Titulo da vaga | Job title: ";
pub const DESCRIPTION_QUESTION: &str = "Descrição da vaga | Job description: ";

#[derive(Parser, Debug)]
#[command(name = "resume-forge")]
#[command(about = "Generate a tailored resume PDF from personal data and an AI-written narrative")]
pub struct Cli {
    /// YAML configuration file; defaults apply when it is absent
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Output language (pt or eng); asked interactively when omitted
    #[arg(long)]
    pub lang: Option<Language>,

    /// Directory for generated PDFs
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value = "resume_generator.log")]
    pub log_file: PathBuf,
}

/// Line-oriented terminal dialogue
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from terminal")?;
        if read == 0 {
            anyhow::bail!("Input closed while waiting for an answer");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until a supported language code is entered
    pub fn select_language(&mut self) -> Result<Language> {
        loop {
            let answer = self.ask(LANGUAGE_QUESTION)?;
            match answer.parse::<Language>() {
                Ok(lang) => {
                    info!("Language selected: {}", lang);
                    return Ok(lang);
                }
                Err(e) => {
                    writeln!(self.output, "{}", e).context("Failed to write message")?;
                }
            }
        }
    }

    pub fn job_posting(&mut self) -> Result<JobPosting> {
        let title = self.ask(TITLE_QUESTION)?.trim().to_string();
        let description = self.ask(DESCRIPTION_QUESTION)?.trim().to_string();
        Ok(JobPosting { title, description })
    }
}
