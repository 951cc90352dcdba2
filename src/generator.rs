// src/generator.rs
//! Drives one resume-generation request from prompt to PDF.
//!
//! Flow: assemble prompt → send → parse (re-send while the retry budget
//! lasts) → translate when the output language needs it → fill template →
//! render PDF. Quota exhaustion on any send stops the run immediately.

use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::{GeneratorConfig, Language, NarrativeKeyConfig};
use crate::core::{ChatSession, FsOps, TemplateEngine};
use crate::error::GenerationError;
use crate::pacing::{FixedIntervalPacer, Pacer};
use crate::pdf::{PdfRenderer, WkhtmltopdfRenderer};
use crate::prompt::{assemble_prompt, AssembledPrompt, JobPosting, PromptFragment};
use crate::response_parser::{parse_narrative, parse_translation, GeneratedNarrative};
use crate::types::PersonalData;
use crate::utils::output_file_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Idle,
    PromptBuilt,
    Sent,
    Parsed,
    ParseFailed,
    Retrying,
    Abandoned,
    TemplateFilled,
    Rendered,
}

/// Driver knobs taken from [`GeneratorConfig`]
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    /// Total generation requests allowed before abandoning
    pub retry_budget: u32,
    pub field_declaration: String,
    pub translation_prefix: String,
    pub narrative_keys: NarrativeKeyConfig,
    pub output_dir: PathBuf,
}

impl From<&GeneratorConfig> for GenerationSettings {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            retry_budget: config.retry_budget,
            field_declaration: config.field_declaration.clone(),
            translation_prefix: config.translation_prefix.clone(),
            narrative_keys: config.narrative_keys.clone(),
            output_dir: config.output_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub language: Language,
    pub output: PathBuf,
    /// Generation attempts, translation requests excluded
    pub attempts: u32,
    pub requests_sent: u32,
    pub translated: bool,
}

pub struct ResumeGenerator {
    session: Box<dyn ChatSession>,
    pacer: Box<dyn Pacer>,
    renderer: Box<dyn PdfRenderer>,
    templates: TemplateEngine,
    settings: GenerationSettings,
    state: GenerationState,
    requests_sent: u32,
}

impl ResumeGenerator {
    /// Generator with the configured pacing interval and PDF converter
    pub fn new(config: &GeneratorConfig, session: Box<dyn ChatSession>) -> Self {
        Self {
            session,
            pacer: Box::new(FixedIntervalPacer::new(config.pacing_interval())),
            renderer: Box::new(WkhtmltopdfRenderer::new(config.pdf_renderer.clone())),
            templates: TemplateEngine::new(config.templates_dir.clone()),
            settings: GenerationSettings::from(config),
            state: GenerationState::Idle,
            requests_sent: 0,
        }
    }

    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn PdfRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn requests_sent(&self) -> u32 {
        self.requests_sent
    }

    pub fn session(&self) -> &dyn ChatSession {
        self.session.as_ref()
    }

    pub async fn generate(
        &mut self,
        lang: Language,
        job: &JobPosting,
        personal: &PersonalData,
        fragments: &[PromptFragment],
    ) -> Result<GenerationReport, GenerationError> {
        self.transition(GenerationState::Idle);
        info!("Generating {} resume for '{}'", lang, job.title);

        let prompt = assemble_prompt(
            fragments,
            job,
            personal,
            &self.settings.field_declaration,
        );
        self.transition(GenerationState::PromptBuilt);

        let (narrative, attempts) = self.request_narrative(&prompt).await?;

        let translated = lang.needs_translation();
        let narrative = if translated {
            self.translate(&narrative).await?
        } else {
            narrative
        };

        let keys = self.settings.narrative_keys.for_language(lang);
        let data: Map<String, Value> = personal.merged_with(narrative.keyed(keys));
        let html = self.templates.render(lang, &data).await?;
        self.transition(GenerationState::TemplateFilled);

        FsOps::ensure_dir_exists(&self.settings.output_dir).await?;
        let output = output_file_path(&self.settings.output_dir, lang);
        self.renderer.render(&html, &output)?;
        self.transition(GenerationState::Rendered);

        info!(
            "Resume written to {} after {} requests",
            output.display(),
            self.requests_sent
        );

        Ok(GenerationReport {
            language: lang,
            output,
            attempts,
            requests_sent: self.requests_sent,
            translated,
        })
    }

    /// Send the same prompt until it parses or the budget runs out
    async fn request_narrative(
        &mut self,
        prompt: &AssembledPrompt,
    ) -> Result<(GeneratedNarrative, u32), GenerationError> {
        let budget = self.settings.retry_budget.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let raw = self.send(prompt.lines()).await?;

            match parse_narrative(&raw) {
                Ok(narrative) => {
                    self.transition(GenerationState::Parsed);
                    return Ok((narrative, attempt));
                }
                Err(parse_error) => {
                    self.transition(GenerationState::ParseFailed);
                    warn!(
                        "Attempt {}/{} returned a malformed answer: {}",
                        attempt, budget, parse_error
                    );
                    if attempt >= budget {
                        self.transition(GenerationState::Abandoned);
                        error!("Abandoning generation after {} attempts", attempt);
                        return Err(GenerationError::Abandoned {
                            attempts: attempt,
                            last: parse_error,
                        });
                    }
                    self.transition(GenerationState::Retrying);
                }
            }
        }
    }

    async fn translate(
        &mut self,
        narrative: &GeneratedNarrative,
    ) -> Result<GeneratedNarrative, GenerationError> {
        Ok(GeneratedNarrative {
            objective: self
                .translate_field("objective", &narrative.objective)
                .await?,
            characteristics: self
                .translate_field("characteristics", &narrative.characteristics)
                .await?,
            qualifications: self
                .translate_field("qualifications", &narrative.qualifications)
                .await?,
        })
    }

    async fn translate_field(
        &mut self,
        field: &'static str,
        text: &str,
    ) -> Result<String, GenerationError> {
        let turn = [format!("{}{}", self.settings.translation_prefix, text)];
        let raw = self.send(&turn).await?;
        debug!("Translated {} field", field);
        parse_translation(&raw).ok_or(GenerationError::EmptyTranslation { field })
    }

    /// Every AI request of the run goes through here so pacing covers all of them
    async fn send(&mut self, parts: &[String]) -> Result<String, GenerationError> {
        if self.requests_sent > 0 {
            self.pacer.wait().await;
        }
        self.requests_sent += 1;
        self.transition(GenerationState::Sent);

        self.session.send(parts).await.map_err(|e| {
            error!("Request {} failed: {}", self.requests_sent, e);
            GenerationError::from(e)
        })
    }

    fn transition(&mut self, next: GenerationState) {
        debug!("Generation state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChatTurn;
    use crate::error::ChatError;
    use crate::pacing::NoPacing;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    const GOOD: &str = "Objetivo: liderar\n\nPessoais: calma\n\nResumo: dez anos";

    struct ScriptedSession {
        replies: VecDeque<Result<String, ChatError>>,
        sent: Arc<Mutex<Vec<Vec<String>>>>,
        history: Vec<ChatTurn>,
    }

    impl ScriptedSession {
        fn new(replies: Vec<Result<String, ChatError>>) -> (Self, Arc<Mutex<Vec<Vec<String>>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            let session = Self {
                replies: replies.into(),
                sent: Arc::clone(&sent),
                history: Vec::new(),
            };
            (session, sent)
        }
    }

    #[async_trait]
    impl ChatSession for ScriptedSession {
        async fn send(&mut self, parts: &[String]) -> Result<String, ChatError> {
            self.sent.lock().unwrap().push(parts.to_vec());
            let reply = self
                .replies
                .pop_front()
                .unwrap_or_else(|| Ok("no more script".to_string()))?;
            self.history.push(ChatTurn::user(parts));
            self.history.push(ChatTurn::model(reply.clone()));
            Ok(reply)
        }

        fn history(&self) -> &[ChatTurn] {
            &self.history
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        rendered: Arc<Mutex<Vec<(String, PathBuf)>>>,
    }

    impl PdfRenderer for RecordingRenderer {
        fn render(&self, html: &str, output: &Path) -> Result<()> {
            self.rendered
                .lock()
                .unwrap()
                .push((html.to_string(), output.to_path_buf()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        waits: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn wait(&self) {
            *self.waits.lock().unwrap() += 1;
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: GeneratorConfig,
    }

    fn fixture(budget: u32) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("template-pt.html"),
            "<h1>{nome}</h1><p>{objetivo}</p><p>{pessoais}</p><p>{resumo}</p>",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("template-eng.html"),
            "<h1>{nome}</h1><p>{objective}</p><p>{pessoais}</p><p>{resumo}</p>",
        )
        .unwrap();
        let config = GeneratorConfig::default()
            .with_templates_dir(dir.path().to_path_buf())
            .with_output_dir(dir.path().join("out"))
            .with_retry_budget(budget);
        Fixture { _dir: dir, config }
    }

    fn personal() -> PersonalData {
        match json!({"nome": "Ana"}) {
            Value::Object(map) => PersonalData::new(map),
            _ => unreachable!(),
        }
    }

    fn job() -> JobPosting {
        JobPosting {
            title: "Engenheira".to_string(),
            description: "Rust".to_string(),
        }
    }

    fn generator(
        config: &GeneratorConfig,
        session: ScriptedSession,
    ) -> (ResumeGenerator, Arc<Mutex<Vec<(String, PathBuf)>>>) {
        let renderer = RecordingRenderer::default();
        let rendered = Arc::clone(&renderer.rendered);
        let generator = ResumeGenerator::new(config, Box::new(session))
            .with_pacer(Box::new(NoPacing))
            .with_renderer(Box::new(renderer));
        (generator, rendered)
    }

    #[tokio::test]
    async fn test_first_answer_renders_portuguese() {
        let fx = fixture(5);
        let (session, sent) = ScriptedSession::new(vec![Ok(GOOD.to_string())]);
        let (mut generator, rendered) = generator(&fx.config, session);

        let report = generator
            .generate(Language::Pt, &job(), &personal(), &[])
            .await
            .unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(report.requests_sent, 1);
        assert!(!report.translated);
        assert_eq!(generator.state(), GenerationState::Rendered);
        assert_eq!(sent.lock().unwrap().len(), 1);

        let rendered = rendered.lock().unwrap();
        assert_eq!(
            rendered[0].0,
            "<h1>Ana</h1><p>liderar</p><p>calma</p><p>dez anos</p>"
        );
        assert_eq!(rendered[0].1, report.output);
        assert!(report.output.starts_with(fx.config.output_dir.as_path()));
    }

    #[tokio::test]
    async fn test_retries_until_parse_succeeds() {
        let fx = fixture(5);
        let (session, sent) = ScriptedSession::new(vec![
            Ok("Objetivo: só um campo".to_string()),
            Ok("A: 1\n\nB: 2".to_string()),
            Ok(GOOD.to_string()),
        ]);
        let (mut generator, rendered) = generator(&fx.config, session);

        let report = generator
            .generate(Language::Pt, &job(), &personal(), &[])
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        // every retry re-sends the identical prompt
        assert!(sent.iter().all(|turn| turn == &sent[0]));
        assert_eq!(rendered.lock().unwrap().len(), 1);
        assert_eq!(generator.session().history().len(), 6);
    }

    #[tokio::test]
    async fn test_abandons_after_budget() {
        let fx = fixture(4);
        let replies = (0..10).map(|_| Ok("sem formato".to_string())).collect();
        let (session, sent) = ScriptedSession::new(replies);
        let (mut generator, rendered) = generator(&fx.config, session);

        let err = generator
            .generate(Language::Pt, &job(), &personal(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Abandoned { attempts: 4, .. }));
        assert!(err.is_reportable());
        assert_eq!(sent.lock().unwrap().len(), 4);
        assert!(rendered.lock().unwrap().is_empty());
        assert_eq!(generator.state(), GenerationState::Abandoned);
    }

    #[tokio::test]
    async fn test_quota_halts_without_retry() {
        let fx = fixture(5);
        let (session, sent) = ScriptedSession::new(vec![
            Ok("malformed".to_string()),
            Err(ChatError::QuotaExhausted),
            Ok(GOOD.to_string()),
        ]);
        let (mut generator, rendered) = generator(&fx.config, session);

        let err = generator
            .generate(Language::Pt, &job(), &personal(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::QuotaExhausted));
        assert_eq!(sent.lock().unwrap().len(), 2);
        assert!(rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_english_translates_each_field() {
        let fx = fixture(5);
        let (session, sent) = ScriptedSession::new(vec![
            Ok(GOOD.to_string()),
            Ok("lead".to_string()),
            Ok("calm".to_string()),
            Ok("ten years: mostly Rust".to_string()),
        ]);
        let (mut generator, rendered) = generator(&fx.config, session);

        let report = generator
            .generate(Language::Eng, &job(), &personal(), &[])
            .await
            .unwrap();

        assert!(report.translated);
        assert_eq!(report.attempts, 1);
        assert_eq!(report.requests_sent, 4);

        let sent = sent.lock().unwrap();
        assert_eq!(
            sent[1],
            vec!["Traduza para inglês sem mudar o formato, apenas traduza liderar".to_string()]
        );
        assert_eq!(
            sent[3],
            vec!["Traduza para inglês sem mudar o formato, apenas traduza dez anos".to_string()]
        );
        assert_eq!(
            rendered.lock().unwrap()[0].0,
            "<h1>Ana</h1><p>lead</p><p>calm</p><p>ten years: mostly Rust</p>"
        );
    }

    #[tokio::test]
    async fn test_quota_during_translation_halts() {
        let fx = fixture(5);
        let (session, sent) = ScriptedSession::new(vec![
            Ok(GOOD.to_string()),
            Ok("lead".to_string()),
            Err(ChatError::QuotaExhausted),
        ]);
        let (mut generator, rendered) = generator(&fx.config, session);

        let err = generator
            .generate(Language::Eng, &job(), &personal(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::QuotaExhausted));
        assert_eq!(sent.lock().unwrap().len(), 3);
        assert!(rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_translation_is_reported() {
        let fx = fixture(5);
        let (session, _) = ScriptedSession::new(vec![
            Ok(GOOD.to_string()),
            Ok("   ".to_string()),
        ]);
        let (mut generator, _) = generator(&fx.config, session);

        let err = generator
            .generate(Language::Eng, &job(), &personal(), &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::EmptyTranslation { field: "objective" }
        ));
    }

    #[tokio::test]
    async fn test_pacer_runs_between_requests_only() {
        let fx = fixture(5);
        let (session, _) = ScriptedSession::new(vec![
            Ok("bad".to_string()),
            Ok(GOOD.to_string()),
            Ok("a".to_string()),
            Ok("b".to_string()),
            Ok("c".to_string()),
        ]);
        let pacer = CountingPacer::default();
        let waits = Arc::clone(&pacer.waits);
        let mut generator = ResumeGenerator::new(&fx.config, Box::new(session))
            .with_pacer(Box::new(pacer))
            .with_renderer(Box::new(RecordingRenderer::default()));

        generator
            .generate(Language::Eng, &job(), &personal(), &[])
            .await
            .unwrap();

        assert_eq!(generator.requests_sent(), 5);
        assert_eq!(*waits.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_other_chat_errors_propagate() {
        let fx = fixture(5);
        let (session, _) = ScriptedSession::new(vec![Err(ChatError::Api {
            status: 400,
            message: "API key not valid".to_string(),
        })]);
        let (mut generator, _) = generator(&fx.config, session);

        let err = generator
            .generate(Language::Pt, &job(), &personal(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Chat(ChatError::Api { status: 400, .. })));
        assert!(!err.is_reportable());
    }

    #[tokio::test]
    async fn test_missing_template_is_io_error() {
        let fx = fixture(5);
        let config = fx
            .config
            .clone()
            .with_templates_dir(fx.config.output_dir.join("nowhere"));
        let (session, _) = ScriptedSession::new(vec![Ok(GOOD.to_string())]);
        let (mut generator, rendered) = generator(&config, session);

        let err = generator
            .generate(Language::Pt, &job(), &personal(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Io(_)));
        assert!(rendered.lock().unwrap().is_empty());
    }
}
