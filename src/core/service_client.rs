// src/core/service_client.rs
//! Stateful chat session against the Generative Language API

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{GenerationParams, GeneratorConfig};
use crate::error::ChatError;
use crate::types::gemini::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, Part,
    SafetySetting,
};

const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One exchanged message; a user turn may carry several text parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: Vec<String>,
}

impl ChatTurn {
    pub fn user(parts: &[String]) -> Self {
        Self {
            role: ChatRole::User,
            parts: parts.to_vec(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            parts: vec![text.into()],
        }
    }

    fn to_content(&self) -> Content {
        Content {
            role: self.role.as_str().to_string(),
            parts: self
                .parts
                .iter()
                .map(|text| Part { text: text.clone() })
                .collect(),
        }
    }
}

/// A conversation whose history grows with every successful exchange.
#[async_trait]
pub trait ChatSession: Send {
    /// Send `parts` as a single user turn and return the model's text
    async fn send(&mut self, parts: &[String]) -> Result<String, ChatError>;

    fn history(&self) -> &[ChatTurn];
}

pub struct GeminiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    generation: GenerationParams,
    history: Vec<ChatTurn>,
}

impl GeminiChat {
    pub fn new(config: &GeneratorConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base_url.trim_end_matches('/'),
            config.model
        );
        info!("Chat session configured for {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            api_key,
            generation: config.generation.clone(),
            history: Vec::new(),
        })
    }
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send(&mut self, parts: &[String]) -> Result<String, ChatError> {
        let turn = ChatTurn::user(parts);
        let contents: Vec<Content> = self
            .history
            .iter()
            .chain(std::iter::once(&turn))
            .map(ChatTurn::to_content)
            .collect();

        let request = GenerateContentRequest {
            contents: &contents,
            generation_config: (&self.generation).into(),
            safety_settings: SafetySetting::block_none(),
        };

        debug!(
            "Sending turn with {} parts ({} turns of history)",
            parts.len(),
            self.history.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let payload: GenerateContentResponse = response.json().await?;
        let text = payload.text().ok_or(ChatError::EmptyResponse)?;

        self.history.push(turn);
        self.history.push(ChatTurn::model(text.clone()));
        Ok(text)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}

/// Map a non-success response onto the chat error taxonomy
fn classify_error(status: StatusCode, body: &str) -> ChatError {
    let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();

    let quota = status == StatusCode::TOO_MANY_REQUESTS
        || envelope
            .as_ref()
            .is_some_and(|e| e.error.status == QUOTA_STATUS);
    if quota {
        warn!("Chat API reported quota exhaustion ({})", status);
        return ChatError::QuotaExhausted;
    }

    let message = envelope
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    warn!("Chat API returned {}: {}", status, message);
    ChatError::Api {
        status: status.as_u16(),
        message,
    }
}
