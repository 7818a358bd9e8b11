use async_trait::async_trait;
use docsight_client::{ClientError, ContentGenerator, Result};
use docsight_common::GenerationResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        debug!(model = %self.model, prompt_len = prompt.len(), "Gemini generate request");

        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let request = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: GenerateResponse = super::send_json(request, "gemini").await?;
        first_candidate_text(response)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let response = self.generate_text(prompt).await?;
        Ok(GenerationResult { response })
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

/// `candidates[0].content.parts[0].text`, or a shape error naming the
/// missing segment.
fn first_candidate_text(response: GenerateResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::ResponseShape("gemini: response has no candidates".into()))?;
    let content = candidate.content.ok_or_else(|| {
        ClientError::ResponseShape("gemini: candidates[0] has no content".into())
    })?;
    let part = content.parts.into_iter().next().ok_or_else(|| {
        ClientError::ResponseShape("gemini: candidates[0].content has no parts".into())
    })?;
    part.text.ok_or_else(|| {
        ClientError::ResponseShape("gemini: candidates[0].content.parts[0] has no text".into())
    })
}
