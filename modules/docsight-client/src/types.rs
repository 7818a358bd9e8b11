//! Request bodies for the four function endpoints.
//!
//! Response bodies are the result types in `docsight_common`. Fields default
//! to empty so the handlers can deserialize partial bodies and report which
//! field is missing instead of failing on the parse.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

fn require(present: bool, message: &str) -> Result<()> {
    if present {
        Ok(())
    } else {
        Err(ClientError::Validation(message.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDocumentRequest {
    #[serde(default)]
    pub file_content: String,
    #[serde(default)]
    pub mime_type: String,
}

impl ProcessDocumentRequest {
    pub fn validate(&self) -> Result<()> {
        require(
            !self.file_content.is_empty() && !self.mime_type.is_empty(),
            "Missing fileContent or mimeType in request body.",
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    #[serde(default)]
    pub prompt: String,
}

impl GenerateContentRequest {
    pub fn validate(&self) -> Result<()> {
        require(!self.prompt.is_empty(), "Missing prompt in request body.")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateTextRequest {
    #[serde(default)]
    pub text: String,
    /// Target language code, e.g. `es`.
    #[serde(default)]
    pub target: String,
}

impl TranslateTextRequest {
    pub fn validate(&self) -> Result<()> {
        require(
            !self.text.is_empty() && !self.target.is_empty(),
            "Missing text or target language in request body.",
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeSpeechRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language_code: String,
}

impl SynthesizeSpeechRequest {
    pub fn validate(&self) -> Result<()> {
        require(
            !self.text.is_empty() && !self.language_code.is_empty(),
            "Missing text or languageCode in request body.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_document_uses_wire_names() {
        let req = ProcessDocumentRequest {
            file_content: "JVBERg==".into(),
            mime_type: "application/pdf".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["fileContent"], "JVBERg==");
        assert_eq!(json["mimeType"], "application/pdf");
    }

    #[test]
    fn partial_bodies_deserialize_and_fail_validation() {
        let req: ProcessDocumentRequest =
            serde_json::from_str(r#"{"fileContent":"abc"}"#).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Missing fileContent or mimeType in request body."
        );
    }

    #[test]
    fn speech_request_requires_language_code() {
        let req = SynthesizeSpeechRequest {
            text: "hello".into(),
            language_code: String::new(),
        };
        assert!(req.validate().unwrap_err().is_validation());

        let json = serde_json::to_value(SynthesizeSpeechRequest {
            text: "hello".into(),
            language_code: "en-US".into(),
        })
        .unwrap();
        assert_eq!(json["languageCode"], "en-US");
    }

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(GenerateContentRequest::default().validate().is_err());
        assert!(GenerateContentRequest {
            prompt: "explain".into()
        }
        .validate()
        .is_ok());
    }
}
