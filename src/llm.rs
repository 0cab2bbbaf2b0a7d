//! Groq chat-completion client
//!
//! OpenAI-compatible chat endpoint behind a trait seam so pipeline
//! stages can be tested with a scripted transport.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::AgentError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One chat-completion call: system instruction + user content.
/// `temperature: None` leaves sampling at the provider default.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        temperature: Option<f32>,
    ) -> Result<String>;
}

/// Reusable Groq client (connection-pooled)
pub struct GroqClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url,
        })
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        temperature: Option<f32>,
    ) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(AgentError::Configuration(
                "GROQ_API_KEY not configured".to_string(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_content.to_string(),
                },
            ],
            temperature,
        };

        info!(model = %self.model, "Calling Groq API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Groq API request failed: {}", e);
                AgentError::Llm(format!("Groq API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API error response: {}", error_text);
            return Err(AgentError::Llm(format!("Groq API error: {}", error_text)));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Groq response: {}", e);
            AgentError::Llm(format!("Groq parse error: {}", e))
        })?;

        let answer = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AgentError::Llm("No response from Groq API".to_string()))?;

        Ok(answer)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
