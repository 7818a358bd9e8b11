use async_trait::async_trait;
use docsight_client::{ClientError, Result, SpeechSynthesizer};
use docsight_common::SpeechResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

const TEXT_TO_SPEECH_API_URL: &str = "https://texttospeech.googleapis.com";

/// Cloud Text-to-Speech client. Audio comes back inline and is returned to
/// callers as an `audio/mpeg` data URL.
pub struct TextToSpeechClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TextToSpeechClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: TEXT_TO_SPEECH_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Base64 MP3 audio for `text`.
    pub async fn synthesize_mp3(&self, text: &str, language_code: &str) -> Result<String> {
        let url = format!("{}/v1/text:synthesize", self.base_url);

        debug!(language_code, text_len = text.len(), "Text-to-Speech request");

        let body = SynthesizeRequest {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelection {
                language_code: language_code.to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };
        let request = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response: SynthesizeResponse = super::send_json(request, "texttospeech").await?;
        match response.audio_content {
            Some(audio) if !audio.is_empty() => Ok(audio),
            _ => Err(ClientError::ResponseShape(
                "texttospeech: response has no audioContent".into(),
            )),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for TextToSpeechClient {
    async fn synthesize(&self, text: &str, language_code: &str) -> Result<SpeechResult> {
        let audio = self.synthesize_mp3(text, language_code).await?;
        Ok(SpeechResult {
            audio_url: audio_data_url(&audio),
        })
    }
}

pub fn audio_data_url(base64_mp3: &str) -> String {
    format!("data:audio/mpeg;base64,{base64_mp3}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelection,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection {
    language_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: Option<String>,
}
