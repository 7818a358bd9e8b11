use async_trait::async_trait;
use docsight_common::{
    EncodedPayload, ExtractionResult, GenerationResult, SpeechResult, TranslationResult,
};

use crate::error::Result;

// =============================================================================
// Capability traits
// =============================================================================
//
// Implemented by `FunctionsClient` (calling the hosted functions) and by the
// upstream providers inside the functions server. The pipeline only depends
// on these.

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, payload: &EncodedPayload) -> Result<ExtractionResult>;
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;
}

#[async_trait]
pub trait TextTranslator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<TranslationResult>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<SpeechResult>;
}
