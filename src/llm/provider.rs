use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{LlmConfig, LlmProviderType};

/// Trait for LLM providers that can generate text, optionally grounded
/// in attached images.
pub trait LlmProvider: Send + Sync {
    fn generate(&self, prompt: &str, images: &[&Path]) -> Result<String>;

    /// Get the provider name for display
    fn provider_name(&self) -> &'static str;
}

/// Create a provider from configuration. LM Studio speaks the
/// OpenAI-compatible API, so both map to the same implementation.
pub fn create_provider(config: &LlmConfig) -> Box<dyn LlmProvider> {
    match config.provider {
        LlmProviderType::LmStudio | LlmProviderType::OpenAI => Box::new(
            OpenAICompatibleProvider::new(&config.endpoint, &config.model, config.api_key.as_deref()),
        ),
        LlmProviderType::Ollama => {
            Box::new(OllamaProvider::new(&config.endpoint, &config.model))
        }
    }
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

fn encode_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(BASE64.encode(bytes))
}

// ============================================================================
// OpenAI-compatible provider (works with LM Studio, OpenAI, and compatible APIs)
// ============================================================================

pub struct OpenAICompatibleProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAICompatibleProvider {
    pub fn new(endpoint: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(|s| s.to_string()),
        }
    }
}

impl LlmProvider for OpenAICompatibleProvider {
    fn generate(&self, prompt: &str, images: &[&Path]) -> Result<String> {
        let mut content = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];
        for path in images {
            let data_url = format!("data:{};base64,{}", guess_mime(path), encode_image(path)?);
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl { url: data_url },
            });
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            max_tokens: 1200,
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", self.endpoint);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(120))
            .build();

        let mut req = agent.post(&url).set("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            req = req.set("Authorization", &format!("Bearer {}", key));
        }

        let response: ChatResponse = req
            .send_json(&request)
            .context("Failed to send request to LLM")?
            .into_json()
            .context("Failed to parse LLM response")?;

        response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| anyhow!("No choices in LLM response"))
    }

    fn provider_name(&self) -> &'static str {
        "openai-compatible"
    }
}

// ============================================================================
// Ollama provider
// ============================================================================

pub struct OllamaProvider {
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

impl LlmProvider for OllamaProvider {
    fn generate(&self, prompt: &str, images: &[&Path]) -> Result<String> {
        let encoded: Result<Vec<String>> = images.iter().map(|p| encode_image(p)).collect();
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            images: encoded?,
            stream: false,
        };

        let url = format!("{}/api/generate", self.endpoint);
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(120))
            .build();

        let response: OllamaResponse = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(&request)
            .context("Failed to send request to Ollama")?
            .into_json()
            .context("Failed to parse Ollama response")?;

        Ok(response.response)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}
