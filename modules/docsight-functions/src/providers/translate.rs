use async_trait::async_trait;
use docsight_client::{ClientError, Result, TextTranslator};
use docsight_common::TranslationResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TRANSLATE_API_URL: &str = "https://translation.googleapis.com";

/// Cloud Translation v2 (basic) client.
pub struct TranslateClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TranslateClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: TRANSLATE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub async fn translate_text(&self, text: &str, target: &str) -> Result<String> {
        let url = format!("{}/language/translate/v2", self.base_url);

        debug!(target, text_len = text.len(), "Translate request");

        let body = TranslateRequest {
            q: vec![text.to_string()],
            target: target.to_string(),
            format: "text",
        };
        let request = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: TranslateResponse = super::send_json(request, "translate").await?;
        response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ClientError::ResponseShape("translate: response has no translations".into()))
    }
}

#[async_trait]
impl TextTranslator for TranslateClient {
    async fn translate(&self, text: &str, target: &str) -> Result<TranslationResult> {
        let translated_text = self.translate_text(text, target).await?;
        Ok(TranslationResult { translated_text })
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest {
    q: Vec<String>,
    target: String,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslationsData,
}

#[derive(Debug, Deserialize)]
struct TranslationsData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}
