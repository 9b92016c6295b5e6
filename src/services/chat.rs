//! Chat proxy
//!
//! Messages are logged per session and the recent window is forwarded to an
//! OpenAI-compatible completion endpoint. Provider failures never reach the
//! caller: they are answered with a canned reply that is logged like any other
//! assistant message.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::db::ChatRepository;
use crate::models::{ChatResponse, ChatRole, PromptMessage};

pub const NOT_CONFIGURED_REPLY: &str =
    "Sorry, the chat service is not configured. Please contact an administrator.";
pub const API_ERROR_REPLY: &str =
    "Sorry, I'm having trouble connecting to the chat service. Please try again later.";
pub const NETWORK_ERROR_REPLY: &str = "Sorry, there was a network error. Please try again later.";
pub const UNEXPECTED_REPLY: &str = "Sorry, something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider is not configured")]
    NotConfigured,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl CompletionError {
    /// Reply shown to the user in place of a completion
    pub fn fallback_reply(&self) -> &'static str {
        match self {
            CompletionError::NotConfigured => NOT_CONFIGURED_REPLY,
            CompletionError::Network(_) => NETWORK_ERROR_REPLY,
            CompletionError::Api { .. } => API_ERROR_REPLY,
            CompletionError::InvalidResponse(_) => UNEXPECTED_REPLY,
        }
    }
}

/// Source of assistant replies
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// `messages` starts with the system prompt followed by history, oldest first
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Client for `/chat/completions` style APIs
pub struct OpenAiCompletionClient {
    http_client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompletionClient {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.api_url.trim_end_matches('/')),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_ref().ok_or(CompletionError::NotConfigured)?;

        let payload = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| CompletionError::InvalidResponse("no choices returned".to_string()))
    }
}

/// Session bookkeeping around a [`CompletionProvider`]
#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
    history_window: usize,
}

impl ChatService {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &ChatConfig) -> Self {
        Self {
            provider,
            system_prompt: config.system_prompt.clone(),
            history_window: config.history_window.max(1),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let client = OpenAiCompletionClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Log `message`, ask the provider for a reply and log that too
    ///
    /// A missing `session_key` starts a new session under a generated id.
    pub async fn send(
        &self,
        pool: &SqlitePool,
        session_key: Option<&str>,
        user_id: Option<Uuid>,
        message: &str,
    ) -> Result<ChatResponse> {
        let session_key = session_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let repo = ChatRepository::new(pool);
        let session = repo.get_or_create_session(&session_key, user_id).await?;
        repo.append_message(session.id, ChatRole::User, message).await?;

        let history = repo
            .recent_messages(session.id, self.history_window as i64)
            .await?;

        let mut prompt = Vec::with_capacity(history.len() + 1);
        prompt.push(PromptMessage {
            role: ChatRole::System,
            content: self.system_prompt.clone(),
        });
        prompt.extend(history.iter().map(PromptMessage::from));

        let reply = match self.provider.complete(&prompt).await {
            Ok(reply) => {
                debug!(session = %session_key, "Chat completion received");
                reply
            }
            Err(CompletionError::NotConfigured) => {
                warn!("Chat completion requested but no API key is configured");
                NOT_CONFIGURED_REPLY.to_string()
            }
            Err(e) => {
                error!(session = %session_key, error = %e, "Chat completion failed");
                e.fallback_reply().to_string()
            }
        };

        repo.append_message(session.id, ChatRole::Assistant, &reply)
            .await?;

        Ok(ChatResponse {
            response: reply,
            session_id: session_key,
        })
    }
}
