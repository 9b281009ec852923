//! OpenAI provider
//!
//! Plain agents go through the Chat Completions API. Descriptors that carry
//! the `web_search` tool go through the Responses API with the hosted
//! web-search tool enabled.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{Provider, ProviderDescriptor, ProviderOutput};
use crate::util::{CONNECT_TIMEOUT, INFER_TIMEOUT, REDIRECT_LIMIT};

/// OpenAI API base
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Used when a descriptor leaves the model empty
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(INFER_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
            .user_agent("agnoflow/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
        })
    }

    /// Point at an OpenAI-compatible server (proxies, local gateways, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn model<'a>(&self, descriptor: &'a ProviderDescriptor) -> &'a str {
        if descriptor.model.is_empty() {
            OPENAI_DEFAULT_MODEL
        } else {
            &descriptor.model
        }
    }

    fn build_messages(descriptor: &ProviderDescriptor, input: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);

        if !descriptor.instructions.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: descriptor.instructions.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: input.to_string(),
        });

        messages
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                provider = "openai",
                status = %status,
                error = %error_text,
                "OpenAI API error"
            );
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        Ok(response)
    }

    async fn chat(&self, descriptor: &ProviderDescriptor, input: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: self.model(descriptor).to_string(),
            messages: Self::build_messages(descriptor, input),
            max_tokens: descriptor.max_tokens,
            temperature: descriptor.temperature,
        };

        tracing::debug!(
            provider = "openai",
            model = %payload.model,
            messages_count = payload.messages.len(),
            "Sending chat completion request"
        );

        let api_response: ChatCompletionResponse = self
            .post("/chat/completions", &payload)
            .await?
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        if let Some(usage) = &api_response.usage {
            tracing::debug!(
                provider = "openai",
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI API response received"
            );
        }

        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("OpenAI API response had no choices")
    }

    async fn web_search(&self, descriptor: &ProviderDescriptor, input: &str) -> Result<String> {
        let payload = json!({
            "model": self.model(descriptor),
            "instructions": descriptor.instructions,
            "input": input,
            "tools": [{ "type": "web_search_preview" }],
        });

        tracing::debug!(provider = "openai", model = %self.model(descriptor), "Sending web search request");

        let body: Value = self
            .post("/responses", &payload)
            .await?
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        extract_output_text(&body).context("OpenAI web search response had no text output")
    }
}

/// Collect `output_text` parts from a Responses API body
fn extract_output_text(body: &Value) -> Option<String> {
    if let Some(text) = body.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = body
        .get("output")?
        .as_array()?
        .iter()
        .filter(|item| item["type"] == "message")
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter(|part| part["type"] == "output_text")
        .filter_map(|part| part["text"].as_str())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn execute(
        &self,
        descriptor: &ProviderDescriptor,
        input: &str,
    ) -> Result<ProviderOutput> {
        let text = if descriptor.has_tool("web_search") {
            self.web_search(descriptor, input).await?
        } else {
            self.chat(descriptor, input).await?
        };
        Ok(ProviderOutput::Text(text))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}
