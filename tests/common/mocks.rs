//! Mock services for testing
//!
//! A wiremock server standing in for the completion API, plus a scripted
//! provider for tests that only care about session bookkeeping.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use suitehub::{
    config::AppConfig,
    models::PromptMessage,
    services::{CompletionError, CompletionProvider},
};

pub const MOCK_API_KEY: &str = "sk-test-key";

/// Start a completion server that answers every request with `reply`
pub async fn completion_server(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {}", MOCK_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": reply } }
            ]
        })))
        .mount(&server)
        .await;
    server
}

/// Start a completion server that fails every request with `status`
pub async fn failing_completion_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;
    server
}

/// Point the chat settings of `config` at `server`
pub fn use_completion_server(config: &mut AppConfig, server: &MockServer) {
    config.chat.api_url = server.uri();
    config.chat.api_key = Some(MOCK_API_KEY.to_string());
    config.chat.timeout_secs = 5;
}

/// Provider returning a fixed reply and recording every prompt it sees
#[derive(Default)]
pub struct ScriptedProvider {
    pub reply: String,
    pub prompts: Arc<Mutex<Vec<Vec<PromptMessage>>>>,
}

impl ScriptedProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, CompletionError> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(messages.to_vec());
        Ok(self.reply.clone())
    }
}
