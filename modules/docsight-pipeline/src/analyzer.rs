use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use docsight_client::{ContentGenerator, DocumentExtractor, FunctionsClient};
use docsight_common::{AnalysisRecord, DocumentAnalysis, PipelineConfig, UploadedFile};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::encoder;
use crate::error::{PipelineError, PipelineStep, Result};
use crate::policy::UploadPolicy;

// =============================================================================
// Observable state
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Busy {
        run_id: u64,
    },
}

impl PipelineState {
    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineState::Busy { .. })
    }
}

/// What callers see through [`DocumentAnalyzer::subscribe`].
///
/// Only the most recently started run writes here. A run that was
/// superseded by a newer `analyze` call still returns its result to its own
/// caller, but neither publishes a record nor flips the state to idle.
#[derive(Debug, Clone, Default)]
pub struct PipelineSnapshot {
    pub state: PipelineState,
    pub last_started: u64,
    pub latest_record: Option<Arc<AnalysisRecord>>,
}

/// Resets the state to idle when the run it belongs to ends, on every exit
/// path including a dropped future.
struct RunGuard<'a> {
    shared: &'a watch::Sender<PipelineSnapshot>,
    run_id: u64,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let run_id = self.run_id;
        self.shared.send_if_modified(|snapshot| {
            if snapshot.state == (PipelineState::Busy { run_id }) {
                snapshot.state = PipelineState::Idle;
                true
            } else {
                false
            }
        });
    }
}

// =============================================================================
// Analyzer
// =============================================================================

/// Runs encode → extract → generate for an uploaded file.
pub struct DocumentAnalyzer {
    extractor: Arc<dyn DocumentExtractor>,
    generator: Arc<dyn ContentGenerator>,
    config: PipelineConfig,
    policy: UploadPolicy,
    shared: watch::Sender<PipelineSnapshot>,
}

impl DocumentAnalyzer {
    pub fn new(
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn ContentGenerator>,
        config: PipelineConfig,
    ) -> Self {
        let policy = UploadPolicy::from_config(&config);
        let (shared, _) = watch::channel(PipelineSnapshot::default());
        Self {
            extractor,
            generator,
            config,
            policy,
            shared,
        }
    }

    /// Both steps go through the same hosted functions client.
    pub fn from_client(client: FunctionsClient, config: PipelineConfig) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client, config)
    }

    pub fn state(&self) -> PipelineState {
        self.shared.borrow().state
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    pub fn latest_record(&self) -> Option<Arc<AnalysisRecord>> {
        self.shared.borrow().latest_record.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.shared.subscribe()
    }

    /// Extract the document's text and explain it.
    ///
    /// Generation is skipped when extraction yields no text; the configured
    /// fallback explanation is used instead.
    pub async fn analyze(&self, file: &UploadedFile) -> Result<DocumentAnalysis> {
        let (analysis, _) = self.execute(file).await?;
        Ok(analysis)
    }

    /// Same as [`analyze`](Self::analyze), assembled into a record stamped
    /// with the current time.
    pub async fn analyze_record(&self, file: &UploadedFile) -> Result<AnalysisRecord> {
        let (_, record) = self.execute(file).await?;
        Ok(record)
    }

    async fn execute(&self, file: &UploadedFile) -> Result<(DocumentAnalysis, AnalysisRecord)> {
        self.policy.validate(file)?;

        let guard = self.begin();
        let run_id = guard.run_id;
        let started = Instant::now();
        info!(run_id, file = file.name(), size = file.size(), "Analysis started");

        let outcome = self.run_steps(file).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let analysis = match outcome {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(run_id, file = file.name(), elapsed_ms, error = %e, "Analysis failed");
                return Err(e);
            }
        };

        let record = AnalysisRecord::assemble(file, &analysis, Utc::now());
        if self.publish(run_id, &record) {
            info!(run_id, file = file.name(), elapsed_ms, "Analysis finished");
        } else {
            warn!(
                run_id,
                file = file.name(),
                elapsed_ms,
                "Analysis superseded by a newer run, result not published"
            );
        }

        drop(guard);
        Ok((analysis, record))
    }

    async fn run_steps(&self, file: &UploadedFile) -> Result<DocumentAnalysis> {
        let payload = encoder::encode(file).await?;
        debug!(payload_len = payload.content.len(), "Document encoded");

        let extraction = self
            .extractor
            .extract(&payload)
            .await
            .map_err(PipelineError::service(PipelineStep::Extraction))?;
        // Payload is not needed past extraction.
        drop(payload);

        let explanation = if extraction.text.is_empty() {
            debug!("No text extracted, skipping generation");
            self.config.fallback_explanation.clone()
        } else {
            let prompt = self.config.render_prompt(&extraction.text);
            let generated = self
                .generator
                .generate(&prompt)
                .await
                .map_err(PipelineError::service(PipelineStep::Generation))?;
            if generated.response.is_empty() {
                self.config.fallback_explanation.clone()
            } else {
                generated.response
            }
        };

        Ok(DocumentAnalysis {
            extraction,
            explanation,
        })
    }

    fn begin(&self) -> RunGuard<'_> {
        let mut run_id = 0;
        self.shared.send_modify(|snapshot| {
            snapshot.last_started += 1;
            run_id = snapshot.last_started;
            snapshot.state = PipelineState::Busy { run_id };
        });
        RunGuard {
            shared: &self.shared,
            run_id,
        }
    }

    /// Store the record if `run_id` is still the newest run.
    fn publish(&self, run_id: u64, record: &AnalysisRecord) -> bool {
        self.shared.send_if_modified(|snapshot| {
            if snapshot.last_started == run_id {
                snapshot.latest_record = Some(Arc::new(record.clone()));
                true
            } else {
                false
            }
        })
    }
}
