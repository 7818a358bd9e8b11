//! Upstream provider clients. Each implements one of the capability traits
//! from `docsight_client` so the handlers can swap in fakes.

pub mod document_ai;
pub mod gemini;
pub mod text_to_speech;
pub mod translate;

pub use document_ai::DocumentAiClient;
pub use gemini::GeminiClient;
pub use text_to_speech::TextToSpeechClient;
pub use translate::TranslateClient;

use docsight_client::{ClientError, Result};
use serde::de::DeserializeOwned;

/// Send a prepared request and decode a JSON success body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &str,
) -> Result<T> {
    let resp = request.send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => format!("<unreadable body: {e}>"),
        };
        tracing::debug!(service, status = status.as_u16(), "Upstream returned an error");
        return Err(ClientError::Remote {
            status: status.as_u16(),
            body,
        });
    }

    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| ClientError::ResponseShape(format!("{service}: {e}")))
}
