//! Claude provider using the Anthropic Messages API

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Provider, ProviderDescriptor, ProviderOutput};
use crate::util::{CONNECT_TIMEOUT, INFER_TIMEOUT, REDIRECT_LIMIT};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const CLAUDE_DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct ClaudeProvider {
    api_key: String,
    client: Client,
    base_url: String,
}

impl ClaudeProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(INFER_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
            .user_agent("agnoflow/0.1")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: ANTHROPIC_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Resolve model aliases to full Anthropic model IDs
    fn resolve_model(model: &str) -> &str {
        if model.eq_ignore_ascii_case("sonnet") || model.eq_ignore_ascii_case("claude-sonnet") {
            "claude-sonnet-4-20250514"
        } else if model.eq_ignore_ascii_case("opus") || model.eq_ignore_ascii_case("claude-opus") {
            "claude-opus-4-20250514"
        } else if model.eq_ignore_ascii_case("haiku") || model.eq_ignore_ascii_case("claude-haiku")
        {
            "claude-3-5-haiku-20241022"
        } else if model
            .get(..7)
            .is_some_and(|s| s.eq_ignore_ascii_case("claude-"))
        {
            model
        } else {
            CLAUDE_DEFAULT_MODEL
        }
    }

    fn build_body(descriptor: &ProviderDescriptor, input: &str) -> Value {
        let mut body = json!({
            "model": Self::resolve_model(&descriptor.model),
            "max_tokens": descriptor.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": [
                { "role": "user", "content": input }
            ]
        });

        if !descriptor.instructions.is_empty() {
            body["system"] = json!(descriptor.instructions);
        }
        if let Some(temperature) = descriptor.temperature {
            // Anthropic caps temperature at 1.0
            body["temperature"] = json!(temperature.min(1.0));
        }

        body
    }
}

#[async_trait]
impl Provider for ClaudeProvider {
    fn name(&self) -> &str {
        "claude"
    }

    async fn execute(
        &self,
        descriptor: &ProviderDescriptor,
        input: &str,
    ) -> Result<ProviderOutput> {
        let body = Self::build_body(descriptor, input);
        tracing::debug!(provider = "claude", model = %body["model"], "Sending request to Claude API");

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Claude API error {}: {}", status, body);
        }

        let json: Value = response.json().await?;
        let text: Vec<&str> = json["content"]
            .as_array()
            .context("Invalid response format from Claude API")?
            .iter()
            .filter(|block| block["type"] == "text")
            .filter_map(|block| block["text"].as_str())
            .collect();

        Ok(ProviderOutput::Text(text.join("")))
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model() {
        assert_eq!(ClaudeProvider::resolve_model("sonnet"), "claude-sonnet-4-20250514");
        assert_eq!(ClaudeProvider::resolve_model("HAIKU"), "claude-3-5-haiku-20241022");
        assert_eq!(
            ClaudeProvider::resolve_model("claude-3-opus-20240229"),
            "claude-3-opus-20240229"
        );
        assert_eq!(ClaudeProvider::resolve_model("gpt-4o"), CLAUDE_DEFAULT_MODEL);
    }

    #[test]
    fn test_build_body() {
        let mut d = ProviderDescriptor::new("anthropic", "sonnet").with_instructions("Be brief");
        d.temperature = Some(1.5);

        let body = ClaudeProvider::build_body(&d, "Hello");
        assert_eq!(body["system"], "Be brief");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[test]
    fn test_build_body_without_instructions() {
        let body = ClaudeProvider::build_body(&ProviderDescriptor::new("anthropic", ""), "x");
        assert!(body.get("system").is_none());
        assert!(body.get("temperature").is_none());
    }
}
