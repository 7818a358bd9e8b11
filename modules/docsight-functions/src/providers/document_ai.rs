use async_trait::async_trait;
use docsight_client::{ClientError, DocumentExtractor, Result};
use docsight_common::{EncodedPayload, ExtractionResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Document AI processor client. Authenticates with an OAuth access token.
pub struct DocumentAiClient {
    http: reqwest::Client,
    processor: String,
    access_token: String,
    base_url: String,
}

impl DocumentAiClient {
    /// `processor` is the full resource name; `location` picks the regional
    /// endpoint (`us`, `eu`).
    pub fn new(processor: &str, location: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            processor: processor.trim_matches('/').to_string(),
            access_token: access_token.to_string(),
            base_url: format!("https://{location}-documentai.googleapis.com"),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub async fn process(&self, content: &str, mime_type: &str) -> Result<String> {
        let url = format!("{}/v1/{}:process", self.base_url, self.processor);

        debug!(processor = %self.processor, mime_type, "Document AI process request");

        let body = ProcessRequest {
            raw_document: RawDocument {
                content: content.to_string(),
                mime_type: mime_type.to_string(),
            },
        };
        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body);

        let response: ProcessResponse = super::send_json(request, "documentai").await?;
        document_text(response)
    }
}

#[async_trait]
impl DocumentExtractor for DocumentAiClient {
    async fn extract(&self, payload: &EncodedPayload) -> Result<ExtractionResult> {
        let text = self.process(&payload.content, &payload.media_type).await?;
        Ok(ExtractionResult { text })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest {
    raw_document: RawDocument,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    content: String,
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    text: Option<String>,
}

/// Empty strings are omitted from the JSON encoding, so a document without
/// `text` means nothing was recognised. A missing `document` is a shape error.
fn document_text(response: ProcessResponse) -> Result<String> {
    let document = response
        .document
        .ok_or_else(|| ClientError::ResponseShape("documentai: response has no document".into()))?;
    Ok(document.text.unwrap_or_default())
}
