pub mod error;
pub mod traits;
pub mod types;

pub use error::{ClientError, Result};
pub use traits::{ContentGenerator, DocumentExtractor, SpeechSynthesizer, TextTranslator};
pub use types::{
    GenerateContentRequest, ProcessDocumentRequest, SynthesizeSpeechRequest,
    TranslateTextRequest,
};

use async_trait::async_trait;
use docsight_common::{
    EncodedPayload, ExtractionResult, GenerationResult, ServiceConfig, SpeechResult,
    TranslationResult,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Client for the hosted request handlers. One POST per call, no retries.
#[derive(Clone)]
pub struct FunctionsClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl FunctionsClient {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Send the document to the extraction function.
    pub async fn process_document(
        &self,
        file_content: &str,
        mime_type: &str,
    ) -> Result<ExtractionResult> {
        let body = ProcessDocumentRequest {
            file_content: file_content.to_string(),
            mime_type: mime_type.to_string(),
        };
        body.validate()?;

        tracing::debug!(
            mime_type,
            payload_len = file_content.len(),
            "Sending document for extraction"
        );
        self.post(&self.config.paths.process_document, &body).await
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<GenerationResult> {
        let body = GenerateContentRequest {
            prompt: prompt.to_string(),
        };
        body.validate()?;

        tracing::debug!(prompt_len = prompt.len(), "Requesting generated content");
        self.post(&self.config.paths.generate_content, &body).await
    }

    pub async fn translate_text(&self, text: &str, target: &str) -> Result<TranslationResult> {
        let body = TranslateTextRequest {
            text: text.to_string(),
            target: target.to_string(),
        };
        body.validate()?;

        tracing::debug!(target, text_len = text.len(), "Requesting translation");
        self.post(&self.config.paths.translate_text, &body).await
    }

    pub async fn synthesize_speech(&self, text: &str, language_code: &str) -> Result<SpeechResult> {
        let body = SynthesizeSpeechRequest {
            text: text.to_string(),
            language_code: language_code.to_string(),
        };
        body.validate()?;

        tracing::debug!(language_code, text_len = text.len(), "Requesting speech synthesis");
        self.post(&self.config.paths.synthesize_speech, &body).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let mut request = self.client.post(&url).json(body);
        if let Some(ref token) = self.config.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable body: {e}>"),
        };
            tracing::debug!(path, status = status.as_u16(), "Function returned an error");
            return Err(ClientError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::ResponseShape(format!("{path}: {e}")))
    }
}

#[async_trait]
impl DocumentExtractor for FunctionsClient {
    async fn extract(&self, payload: &EncodedPayload) -> Result<ExtractionResult> {
        self.process_document(&payload.content, &payload.media_type).await
    }
}

#[async_trait]
impl ContentGenerator for FunctionsClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        self.generate_content(prompt).await
    }
}

#[async_trait]
impl TextTranslator for FunctionsClient {
    async fn translate(&self, text: &str, target: &str) -> Result<TranslationResult> {
        self.translate_text(text, target).await
    }
}

#[async_trait]
impl SpeechSynthesizer for FunctionsClient {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<SpeechResult> {
        self.synthesize_speech(text, language_code).await
    }
}
