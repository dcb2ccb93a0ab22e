//! Language-model trait, the OpenAI-compatible client, and the
//! ordered fallback chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ConfigError, LlmError, LlmResult};
use crate::security::SecretString;
use crate::types::config::LlmConfig;

/// A chat-completion endpoint.
///
/// Implementations take the model id per call so one client can serve a
/// whole fallback chain.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// One-shot completion; returns the raw response text.
    async fn complete(&self, model: &str, prompt: &str) -> LlmResult<String>;

    /// Completion with a JSON-object response-format hint, for
    /// structured extraction mode.
    async fn complete_json(&self, model: &str, prompt: &str) -> LlmResult<String>;
}

/// Client for any endpoint speaking the OpenAI chat-completion dialect
/// (direct API or an internal gateway).
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiCompatClient {
    /// Build a client from endpoint config. The timeout in the config is
    /// the hard per-call timeout; there is no retry-with-backoff.
    pub fn new(config: &LlmConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(Box::new(e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Override the per-call timeout after construction.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(Box::new(e)))?;
        Ok(self)
    }

    async fn chat(&self, model: &str, prompt: &str, json: bool) -> LlmResult<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.0,
            response_format: json.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Http(Box::new(e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatClient {
    async fn complete(&self, model: &str, prompt: &str) -> LlmResult<String> {
        self.chat(model, prompt, false).await
    }

    async fn complete_json(&self, model: &str, prompt: &str) -> LlmResult<String> {
        self.chat(model, prompt, true).await
    }
}

/// An ordered list of model ids tried against one endpoint.
///
/// The first success wins; every failure is collected so the terminal
/// error names each attempt. This is the only retry in the pipeline and
/// it is purely vertical — same call, next model id, no delay.
#[derive(Clone)]
pub struct ModelChain {
    llm: Arc<dyn LanguageModel>,
    models: Vec<String>,
}

impl ModelChain {
    /// Build a chain. `models` must name at least one model.
    pub fn new(llm: Arc<dyn LanguageModel>, models: Vec<String>) -> Self {
        Self { llm, models }
    }

    /// Complete with fallback across the chain.
    pub async fn complete(&self, prompt: &str) -> LlmResult<String> {
        self.run(prompt, false).await
    }

    /// JSON-mode completion with fallback across the chain.
    pub async fn complete_json(&self, prompt: &str) -> LlmResult<String> {
        self.run(prompt, true).await
    }

    async fn run(&self, prompt: &str, json: bool) -> LlmResult<String> {
        let mut attempts = Vec::new();

        for model in &self.models {
            let outcome = if json {
                self.llm.complete_json(model, prompt).await
            } else {
                self.llm.complete(model, prompt).await
            };

            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    if !attempts.is_empty() {
                        info!(model = %model, "fallback model answered");
                    }
                    return Ok(text);
                }
                Ok(_) => attempts.push(format!("{model}: empty response")),
                Err(e) => {
                    warn!(model = %model, error = %e, "model call failed");
                    attempts.push(format!("{model}: {e}"));
                }
            }
        }

        Err(LlmError::AllModelsFailed { attempts })
    }
}
