use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use docsight_client::{
    ClientError, ContentGenerator, DocumentExtractor, GenerateContentRequest,
    ProcessDocumentRequest, SpeechSynthesizer, SynthesizeSpeechRequest, TextTranslator,
    TranslateTextRequest,
};
use docsight_common::EncodedPayload;
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::config::FunctionsConfig;
use crate::providers::{DocumentAiClient, GeminiClient, TextToSpeechClient, TranslateClient};

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn DocumentExtractor>,
    pub generator: Arc<dyn ContentGenerator>,
    pub translator: Arc<dyn TextTranslator>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    /// Wire the Google providers from config.
    pub fn from_config(config: &FunctionsConfig) -> Self {
        let mut document_ai = DocumentAiClient::new(
            &config.document_ai_processor,
            &config.document_ai_location,
            &config.google_access_token,
        );
        if let Some(ref url) = config.document_ai_base_url {
            document_ai = document_ai.with_base_url(url);
        }

        let mut gemini = GeminiClient::new(&config.gemini_api_key, &config.gemini_model);
        if let Some(ref url) = config.gemini_base_url {
            gemini = gemini.with_base_url(url);
        }

        let mut translate = TranslateClient::new(&config.google_api_key);
        if let Some(ref url) = config.translate_base_url {
            translate = translate.with_base_url(url);
        }

        let mut speech = TextToSpeechClient::new(&config.google_api_key);
        if let Some(ref url) = config.text_to_speech_base_url {
            speech = speech.with_base_url(url);
        }

        Self {
            extractor: Arc::new(document_ai),
            generator: Arc::new(gemini),
            translator: Arc::new(translate),
            synthesizer: Arc::new(speech),
        }
    }
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route(
            "/processDocument",
            post(process_document).fallback(method_not_allowed),
        )
        .route(
            "/generateContent",
            post(generate_content).fallback(method_not_allowed),
        )
        .route(
            "/translateText",
            post(translate_text).fallback(method_not_allowed),
        )
        .route(
            "/synthesizeSpeech",
            post(synthesize_speech).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn process_document(State(state): State<AppState>, body: Bytes) -> Response {
    let req: ProcessDocumentRequest = parse_body(&body);
    if let Err(e) = req.validate() {
        return bad_request(e);
    }

    let payload = EncodedPayload {
        content: req.file_content,
        media_type: req.mime_type,
    };
    match state.extractor.extract(&payload).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => internal_error("processDocument", e),
    }
}

async fn generate_content(State(state): State<AppState>, body: Bytes) -> Response {
    let req: GenerateContentRequest = parse_body(&body);
    if let Err(e) = req.validate() {
        return bad_request(e);
    }

    match state.generator.generate(&req.prompt).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => internal_error("generateContent", e),
    }
}

async fn translate_text(State(state): State<AppState>, body: Bytes) -> Response {
    let req: TranslateTextRequest = parse_body(&body);
    if let Err(e) = req.validate() {
        return bad_request(e);
    }

    match state.translator.translate(&req.text, &req.target).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => internal_error("translateText", e),
    }
}

async fn synthesize_speech(State(state): State<AppState>, body: Bytes) -> Response {
    let req: SynthesizeSpeechRequest = parse_body(&body);
    if let Err(e) = req.validate() {
        return bad_request(e);
    }

    match state
        .synthesizer
        .synthesize(&req.text, &req.language_code)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => internal_error("synthesizeSpeech", e),
    }
}

async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}

async fn health() -> &'static str {
    "ok"
}

// =============================================================================
// Helpers
// =============================================================================

/// Unparseable bodies fall back to an empty request, which then fails
/// validation with the field-specific message.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.is_empty() {
        return T::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "Request body is not valid JSON for this endpoint");
        T::default()
    })
}

fn bad_request(err: ClientError) -> Response {
    let message = match err {
        ClientError::Validation(message) => message,
        other => other.to_string(),
    };
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn internal_error(handler: &str, err: ClientError) -> Response {
    error!(handler, error = %err, "Handler failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Internal Server Error: {err}"),
    )
        .into_response()
}
