use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};

use resume_generator::cli::{Cli, Prompter};
use resume_generator::core::{ConfigManager, GeminiChat};
use resume_generator::prompt::load_fragments;
use resume_generator::types::PersonalData;
use resume_generator::ResumeGenerator;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let mut manager = ConfigManager::load(&cli.config)?;
    if let Some(dir) = cli.output_dir {
        manager.generator = manager.generator.with_output_dir(dir);
    }

    let api_key = match manager.load_api_key() {
        Ok(key) => key,
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("Error: {}", e);
            return Ok(());
        }
    };

    let (lang, job) = {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        let lang = match cli.lang {
            Some(lang) => lang,
            None => prompter.select_language()?,
        };
        (lang, prompter.job_posting()?)
    };

    let config = &manager.generator;
    let personal = PersonalData::load(&config.personal_data_path(lang)).await?;
    let fragments = load_fragments(&config.prompt_parts_path()).await?;
    manager.ensure_directories().await?;

    info!(
        "Starting generation: lang={}, model={}, retry_budget={}, pacing={}s",
        lang, config.model, config.retry_budget, config.pacing_secs
    );

    let session = GeminiChat::new(config, api_key)?;
    let mut generator = ResumeGenerator::new(config, Box::new(session));

    match generator.generate(lang, &job, &personal, &fragments).await {
        Ok(report) => {
            println!("Resume created successfully: {}", report.output.display());
            Ok(())
        }
        Err(e) if e.is_reportable() => {
            error!("Generation stopped: {}", e);
            eprintln!("{}", e);
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Resume generation failed")),
    }
}
