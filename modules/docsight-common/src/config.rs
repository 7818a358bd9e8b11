use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Uploads larger than this are rejected before anything is encoded.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const DEFAULT_ACCEPTED_TYPES: &[&str] =
    &["application/pdf", "image/png", "image/jpeg", "image/jpg"];

/// `{document}` is replaced with the extracted text.
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "Provide a detailed explanation of the following document:\n\n{document}";

pub const DEFAULT_FALLBACK_EXPLANATION: &str = "No detailed explanation available.";

const PROMPT_PLACEHOLDER: &str = "{document}";

/// Per-service paths appended to the functions base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePaths {
    pub process_document: String,
    pub generate_content: String,
    pub translate_text: String,
    pub synthesize_speech: String,
}

impl Default for ServicePaths {
    fn default() -> Self {
        Self {
            process_document: "/processDocument".to_string(),
            generate_content: "/generateContent".to_string(),
            translate_text: "/translateText".to_string(),
            synthesize_speech: "/synthesizeSpeech".to_string(),
        }
    }
}

/// Where the request handlers live and how to reach them.
///
/// Built once and handed to the client at construction; nothing reads
/// endpoints from ambient state.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_token: Option<String>,
    pub paths: ServicePaths,
    /// `None` leaves the transport default in place.
    pub request_timeout: Option<Duration>,
}

impl ServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            paths: ServicePaths::default(),
            request_timeout: None,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_paths(mut self, paths: ServicePaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full URL for one of the configured paths.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServicePaths::default();
        let paths = ServicePaths {
            process_document: optional(&lookup, "DOCSIGHT_PATH_PROCESS_DOCUMENT")
                .unwrap_or(defaults.process_document),
            generate_content: optional(&lookup, "DOCSIGHT_PATH_GENERATE_CONTENT")
                .unwrap_or(defaults.generate_content),
            translate_text: optional(&lookup, "DOCSIGHT_PATH_TRANSLATE_TEXT")
                .unwrap_or(defaults.translate_text),
            synthesize_speech: optional(&lookup, "DOCSIGHT_PATH_SYNTHESIZE_SPEECH")
                .unwrap_or(defaults.synthesize_speech),
        };

        let mut config = Self::new(required(&lookup, "DOCSIGHT_FUNCTIONS_URL")?).with_paths(paths);
        config.api_token = optional(&lookup, "DOCSIGHT_API_TOKEN");
        config.request_timeout = parse_optional::<u64>(&lookup, "DOCSIGHT_REQUEST_TIMEOUT_SECS")?
            .map(Duration::from_secs);
        Ok(config)
    }

    fn log_keys(&self) {
        tracing::info!("Service config loaded:");
        tracing::info!("  DOCSIGHT_FUNCTIONS_URL: {}", self.base_url);
        tracing::info!("  DOCSIGHT_API_TOKEN: {}", preview_opt(&self.api_token));
        if let Some(timeout) = self.request_timeout {
            tracing::info!("  DOCSIGHT_REQUEST_TIMEOUT_SECS: {}", timeout.as_secs());
        }
    }
}

/// Knobs for a single analysis run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_upload_bytes: u64,
    pub accepted_media_types: Vec<String>,
    pub prompt_template: String,
    pub fallback_explanation: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted_media_types: DEFAULT_ACCEPTED_TYPES.iter().map(|t| t.to_string()).collect(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            fallback_explanation: DEFAULT_FALLBACK_EXPLANATION.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_upload_bytes: parse_optional(&lookup, "DOCSIGHT_MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            accepted_media_types: optional(&lookup, "DOCSIGHT_ACCEPTED_TYPES")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.accepted_media_types),
            prompt_template: optional(&lookup, "DOCSIGHT_PROMPT_TEMPLATE")
                .map(|t| t.replace("\\n", "\n"))
                .unwrap_or(defaults.prompt_template),
            fallback_explanation: optional(&lookup, "DOCSIGHT_FALLBACK_EXPLANATION")
                .unwrap_or(defaults.fallback_explanation),
        })
    }

    /// Wrap extracted text in the generation prompt. Templates without a
    /// placeholder get the text appended after a blank line.
    pub fn render_prompt(&self, document_text: &str) -> String {
        if self.prompt_template.contains(PROMPT_PLACEHOLDER) {
            self.prompt_template.replace(PROMPT_PLACEHOLDER, document_text)
        } else {
            format!("{}\n\n{}", self.prompt_template, document_text)
        }
    }
}

// -----------------------------------------------------------------------------
// Lookup helpers, shared with the functions server config
// -----------------------------------------------------------------------------

/// Read a value, treating blank strings as unset.
pub fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

pub fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, key) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Comma-separated list, blanks dropped.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// First few characters of a secret, for startup logs.
pub fn preview(val: &str) -> String {
    let n = val
        .char_indices()
        .nth(5)
        .map(|(i, _)| i)
        .unwrap_or(val.len());
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

pub fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => preview(v),
        _ => "<not set>".to_string(),
    }
}
