use docsight_common::config::{optional, parse_optional, preview, preview_opt, required, split_list};
use docsight_common::ConfigError;

/// Server configuration loaded from environment variables.
/// Provider credentials stay in the environment, never in code.
#[derive(Debug, Clone)]
pub struct FunctionsConfig {
    // Web server
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,

    // Generation
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Extraction
    /// Full processor resource name,
    /// `projects/<project>/locations/<location>/processors/<id>`.
    pub document_ai_processor: String,
    pub document_ai_location: String,
    pub google_access_token: String,

    // Translation + speech
    pub google_api_key: String,

    // Upstream overrides
    pub gemini_base_url: Option<String>,
    pub document_ai_base_url: Option<String>,
    pub translate_base_url: Option<String>,
    pub text_to_speech_base_url: Option<String>,
}

impl FunctionsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let gemini_api_key = required(&lookup, "GEMINI_API_KEY")?;
        Ok(Self {
            host: optional(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_optional(&lookup, "PORT")?.unwrap_or(8080),
            allowed_origins: optional(&lookup, "ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            gemini_model: optional(&lookup, "GEMINI_MODEL")
                .unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            document_ai_processor: required(&lookup, "DOCUMENT_AI_PROCESSOR")?,
            document_ai_location: optional(&lookup, "DOCUMENT_AI_LOCATION")
                .unwrap_or_else(|| "us".to_string()),
            google_access_token: required(&lookup, "GOOGLE_ACCESS_TOKEN")?,
            google_api_key: optional(&lookup, "GOOGLE_API_KEY")
                .unwrap_or_else(|| gemini_api_key.clone()),
            gemini_api_key,
            gemini_base_url: optional(&lookup, "GEMINI_BASE_URL"),
            document_ai_base_url: optional(&lookup, "DOCUMENT_AI_BASE_URL"),
            translate_base_url: optional(&lookup, "TRANSLATE_BASE_URL"),
            text_to_speech_base_url: optional(&lookup, "TEXT_TO_SPEECH_BASE_URL"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  GEMINI_API_KEY: {}", preview(&self.gemini_api_key));
        tracing::info!("  GEMINI_MODEL: {}", self.gemini_model);
        tracing::info!("  DOCUMENT_AI_PROCESSOR: {}", self.document_ai_processor);
        tracing::info!("  GOOGLE_ACCESS_TOKEN: {}", preview(&self.google_access_token));
        tracing::info!("  GOOGLE_API_KEY: {}", preview(&self.google_api_key));
        tracing::info!("  GEMINI_BASE_URL: {}", preview_opt(&self.gemini_base_url));
    }
}
