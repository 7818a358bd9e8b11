use docsight_common::{PipelineConfig, UploadedFile};

use crate::error::UploadRejection;

/// Local checks applied before anything is read or sent.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: u64,
    accepted_media_types: Vec<String>,
}

impl UploadPolicy {
    /// An empty type list accepts any media type.
    pub fn new<I, S>(max_bytes: u64, accepted_media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            max_bytes,
            accepted_media_types: accepted_media_types
                .into_iter()
                .map(|t| t.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_upload_bytes, config.accepted_media_types.iter().cloned())
    }

    pub fn validate(&self, file: &UploadedFile) -> Result<(), UploadRejection> {
        let media_type = file.media_type().trim().to_ascii_lowercase();
        if !self.accepted_media_types.is_empty()
            && !self.accepted_media_types.iter().any(|t| *t == media_type)
        {
            return Err(UploadRejection::UnsupportedType(file.media_type().to_string()));
        }

        if file.size() > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                size: file.size(),
                max: self.max_bytes,
            });
        }

        if file.size() == 0 {
            return Err(UploadRejection::Empty);
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
