//! OpenAI-compatible chat completions client
//!
//! Talks to any provider exposing `/chat/completions` with JSON-object
//! response mode. Groq is the default provider.

use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use super::{CapabilityError, GenerativeCapability, PromptSpec, parse_json_object};
use crate::config::LlmConfig;

/// Chat completions API client
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

impl ChatCompletionsClient {
    /// Create a client from the `llm` configuration section
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("No API key configured for the generative capability")?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("tripwise/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }

    fn request_body(&self, spec: &PromptSpec) -> Value {
        let system = format!(
            "{}\n\nRespond ONLY with a JSON object following exactly this structure:\n{}",
            spec.system_instruction,
            serde_json::to_string_pretty(&spec.response_schema_hint).unwrap_or_default()
        );

        json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": &spec.user_instruction}
            ],
            "temperature": spec.temperature,
            "response_format": {"type": "json_object"}
        })
    }
}

#[async_trait]
impl GenerativeCapability for ChatCompletionsClient {
    #[instrument(skip(self, spec), fields(purpose = %spec.purpose, model = %self.model))]
    async fn generate(&self, spec: &PromptSpec) -> Result<Map<String, Value>, CapabilityError> {
        let start_time = Instant::now();
        debug!(
            "Calling chat completions (timeout {}s)",
            spec.timeout.as_secs()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(spec.timeout)
            .json(&self.request_body(spec))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CapabilityError::Timeout {
                        seconds: spec.timeout.as_secs(),
                    }
                } else {
                    CapabilityError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Provider rejected request with HTTP {}", status.as_u16());
            return Err(CapabilityError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CapabilityError::Timeout {
                    seconds: spec.timeout.as_secs(),
                }
            } else {
                CapabilityError::MalformedJson(e.to_string())
            }
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CapabilityError::EmptyResponse)?;

        let object = parse_json_object(&content)?;

        let elapsed = start_time.elapsed();
        info!(
            "Chat completion answered in {:.3}s ({} top-level keys)",
            elapsed.as_secs_f64(),
            object.len()
        );
        if elapsed.as_secs() > 60 {
            warn!("Slow completion: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(object)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::PromptPurpose;
    use std::time::Duration;

    fn llm_config() -> LlmConfig {
        LlmConfig {
            api_key: Some("gsk_test_key_123456".to_string()),
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let config = LlmConfig {
            api_key: None,
            ..LlmConfig::default()
        };
        assert!(ChatCompletionsClient::new(&config).is_err());
    }

    #[test]
    fn test_endpoint_and_body() {
        let client = ChatCompletionsClient::new(&llm_config()).unwrap();
        assert_eq!(
            client.endpoint,
            "https://api.groq.com/openai/v1/chat/completions"
        );

        let spec = PromptSpec {
            purpose: PromptPurpose::TripType,
            system_instruction: "You are a travel expert.".to_string(),
            user_instruction: "Is 'family' a valid trip type?".to_string(),
            response_schema_hint: json!({"is_valid": true}),
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        };
        let body = client.request_body(&spec);

        assert_eq!(body["model"], "llama3-70b-8192");
        assert_eq!(body["response_format"]["type"], "json_object");
        let system = body["messages"][0]["content"].as_str().unwrap();
        assert!(system.starts_with("You are a travel expert."));
        assert!(system.contains("\"is_valid\": true"));
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(client.model_name(), "llama3-70b-8192");
    }
}
