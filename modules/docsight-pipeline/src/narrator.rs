use std::sync::Arc;

use docsight_client::{ClientError, SpeechSynthesizer};
use docsight_common::{AnalysisRecord, SpeechResult, SummaryMode};

use crate::error::{PipelineError, PipelineStep, Result};

/// Reads a record's summary aloud. Never chained after `analyze`; callers
/// invoke it on demand.
pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { synthesizer }
    }

    pub async fn narrate(
        &self,
        record: &AnalysisRecord,
        mode: SummaryMode,
        language_code: &str,
    ) -> Result<SpeechResult> {
        let text = record.summary.get(mode);
        if text.trim().is_empty() {
            return Err(PipelineError::Service {
                step: PipelineStep::Speech,
                source: ClientError::Validation(format!(
                    "Record {} has no summary text to narrate",
                    record.id
                )),
            });
        }

        tracing::debug!(record = %record.id, ?mode, language_code, "Narrating summary");
        self.synthesizer
            .synthesize(text, language_code)
            .await
            .map_err(PipelineError::service(PipelineStep::Speech))
    }
}
