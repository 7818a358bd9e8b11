//! DocumentAnalyzer with in-memory collaborators.
//!
//! The fakes share a call log so tests can assert ordering across the
//! extraction and generation steps.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docsight_client::{ClientError, ContentGenerator, DocumentExtractor, SpeechSynthesizer};
use docsight_common::{
    AnalysisRecord, EncodedPayload, ExtractionResult, GenerationResult, PipelineConfig,
    SpeechResult, SummaryMode, UploadedFile,
};
use docsight_pipeline::{
    decode, DocumentAnalyzer, Narrator, PipelineError, PipelineState, PipelineStep,
    UploadRejection,
};
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

enum Reply {
    Text(String),
    Fail { status: u16, body: String },
}

fn remote(status: u16, body: &str) -> Reply {
    Reply::Fail {
        status,
        body: body.to_string(),
    }
}

struct FakeExtractor {
    log: Arc<CallLog>,
    reply: Reply,
    payloads: Mutex<Vec<EncodedPayload>>,
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeExtractor {
    fn new(log: Arc<CallLog>, reply: Reply) -> Self {
        Self {
            log,
            reply,
            payloads: Mutex::new(Vec::new()),
            entered: Mutex::new(None),
            release: Mutex::new(None),
        }
    }

    /// The first call blocks until `release` fires and signals `entered`.
    fn gated(log: Arc<CallLog>, reply: Reply) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let fake = Self::new(log, reply);
        *fake.entered.lock().unwrap() = Some(entered_tx);
        *fake.release.lock().unwrap() = Some(release_rx);
        (fake, entered_rx, release_tx)
    }
}

#[async_trait]
impl DocumentExtractor for FakeExtractor {
    async fn extract(&self, payload: &EncodedPayload) -> docsight_client::Result<ExtractionResult> {
        self.log.push("extract:start");
        self.payloads.lock().unwrap().push(payload.clone());

        let gate = self.release.lock().unwrap().take();
        if let Some(release) = gate {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                let _ = entered.send(());
            }
            let _ = release.await;
        }

        self.log.push("extract:done");
        match &self.reply {
            Reply::Text(text) => Ok(ExtractionResult { text: text.clone() }),
            Reply::Fail { status, body } => Err(ClientError::Remote {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

struct FakeGenerator {
    log: Arc<CallLog>,
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    fn new(log: Arc<CallLog>, reply: Reply) -> Self {
        Self {
            log,
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> docsight_client::Result<GenerationResult> {
        self.log.push("generate");
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(GenerationResult {
                response: text.clone(),
            }),
            Reply::Fail { status, body } => Err(ClientError::Remote {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

struct Harness {
    log: Arc<CallLog>,
    extractor: Arc<FakeExtractor>,
    generator: Arc<FakeGenerator>,
    analyzer: Arc<DocumentAnalyzer>,
}

fn harness_with(extractor: FakeExtractor, generator_reply: Reply, log: Arc<CallLog>) -> Harness {
    let extractor = Arc::new(extractor);
    let generator = Arc::new(FakeGenerator::new(log.clone(), generator_reply));
    let analyzer = Arc::new(DocumentAnalyzer::new(
        extractor.clone(),
        generator.clone(),
        PipelineConfig::default(),
    ));
    Harness {
        log,
        extractor,
        generator,
        analyzer,
    }
}

fn harness(extract_reply: Reply, generate_reply: Reply) -> Harness {
    let log = Arc::new(CallLog::default());
    harness_with(FakeExtractor::new(log.clone(), extract_reply), generate_reply, log)
}

fn pdf(name: &str) -> UploadedFile {
    UploadedFile::from_bytes(name, "application/pdf", b"%PDF-1.7 lease body".to_vec())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lease_is_extracted_then_explained() {
    let h = harness(
        Reply::Text("This lease...".into()),
        Reply::Text("In simple terms...".into()),
    );
    let file = pdf("lease.pdf");

    let record = h.analyzer.analyze_record(&file).await.unwrap();

    assert_eq!(record.file_name, "lease.pdf");
    assert_eq!(record.summary.simple, "This lease...");
    assert_eq!(record.summary.detailed, "In simple terms...");
    assert_eq!(record.document_type, "application/pdf");
    assert!(record.id.starts_with("lease.pdf"));
    assert!(!h.analyzer.is_busy());

    let prompts = h.generator.prompts.lock().unwrap().clone();
    assert_eq!(
        prompts,
        vec!["Provide a detailed explanation of the following document:\n\nThis lease...".to_string()]
    );
}

#[tokio::test]
async fn extractor_receives_encoded_file() {
    let h = harness(Reply::Text("x".into()), Reply::Text("y".into()));
    let file = pdf("lease.pdf");

    h.analyzer.analyze(&file).await.unwrap();

    let payloads = h.extractor.payloads.lock().unwrap().clone();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].media_type, "application/pdf");
    assert_eq!(decode(&payloads[0].content).unwrap(), b"%PDF-1.7 lease body".to_vec());
}

#[tokio::test]
async fn generation_waits_for_extraction_to_settle() {
    let h = harness(Reply::Text("text".into()), Reply::Text("explained".into()));

    h.analyzer.analyze(&pdf("a.pdf")).await.unwrap();

    assert_eq!(h.log.entries(), vec!["extract:start", "extract:done", "generate"]);
}

#[tokio::test]
async fn empty_extraction_skips_generation() {
    let h = harness(Reply::Text(String::new()), Reply::Text("never used".into()));
    let file = UploadedFile::from_bytes("blank.png", "image/png", vec![0x89, b'P', b'N', b'G']);

    let analysis = h.analyzer.analyze(&file).await.unwrap();

    assert_eq!(analysis.extraction.text, "");
    assert_eq!(analysis.explanation, "No detailed explanation available.");
    assert!(h.generator.prompts.lock().unwrap().is_empty());
    assert!(!h.log.entries().contains(&"generate".to_string()));
}

#[tokio::test]
async fn empty_extraction_record_uses_fallback_detail() {
    let h = harness(Reply::Text(String::new()), Reply::Text("never used".into()));
    let file = UploadedFile::from_bytes("blank.png", "image/png", vec![1, 2, 3]);

    let record = h.analyzer.analyze_record(&file).await.unwrap();
    assert_eq!(record.summary.detailed, "No detailed explanation available.");
}

#[tokio::test]
async fn extraction_server_error_propagates_with_status() {
    let h = harness(remote(500, "internal error"), Reply::Text("unused".into()));

    let err = h.analyzer.analyze(&pdf("lease.pdf")).await.unwrap_err();

    assert_eq!(err.step(), Some(PipelineStep::Extraction));
    assert_eq!(err.status(), Some(500));
    let msg = err.to_string();
    assert!(msg.contains("500"), "message was {msg}");
    assert!(msg.contains("internal error"));
    assert!(!h.analyzer.is_busy());
    assert!(h.generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bad_input_message_is_transparent() {
    let h = harness(remote(400, "bad input"), Reply::Text("unused".into()));

    let err = h.analyzer.analyze(&pdf("lease.pdf")).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("400") || msg.contains("bad input"), "message was {msg}");
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_any_call() {
    let h = harness(Reply::Text("x".into()), Reply::Text("y".into()));
    let file = UploadedFile::from_path(
        "huge.pdf",
        "application/pdf",
        "/nonexistent/huge.pdf",
        11 * 1024 * 1024,
    );
    let rx = h.analyzer.subscribe();

    let err = h.analyzer.analyze(&file).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::UploadRejected(UploadRejection::TooLarge { .. })
    ));
    assert!(h.log.entries().is_empty());
    assert_eq!(rx.borrow().last_started, 0);
    assert_eq!(h.analyzer.state(), PipelineState::Idle);
}

// ---------------------------------------------------------------------------
// Activity flag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn flag_resets_after_encoder_failure() {
    let h = harness(Reply::Text("x".into()), Reply::Text("y".into()));
    let file = UploadedFile::from_path("gone.pdf", "application/pdf", "/nonexistent/gone.pdf", 10);

    let err = h.analyzer.analyze(&file).await.unwrap_err();

    assert!(matches!(err, PipelineError::Encoding(_)));
    assert!(h.log.entries().is_empty());
    assert_eq!(h.analyzer.state(), PipelineState::Idle);
}

#[tokio::test]
async fn flag_resets_after_generation_failure() {
    let h = harness(Reply::Text("text".into()), remote(503, "overloaded"));

    let err = h.analyzer.analyze(&pdf("a.pdf")).await.unwrap_err();

    assert_eq!(err.step(), Some(PipelineStep::Generation));
    assert_eq!(h.analyzer.state(), PipelineState::Idle);
    assert!(h.analyzer.latest_record().is_none());
}

#[tokio::test]
async fn flag_is_busy_while_extraction_is_in_flight() {
    let log = Arc::new(CallLog::default());
    let (extractor, entered, release) = FakeExtractor::gated(log.clone(), Reply::Text("t".into()));
    let h = harness_with(extractor, Reply::Text("e".into()), log);

    let analyzer = h.analyzer.clone();
    let task = tokio::spawn(async move { analyzer.analyze(&pdf("a.pdf")).await });

    entered.await.unwrap();
    assert_eq!(h.analyzer.state(), PipelineState::Busy { run_id: 1 });

    release.send(()).unwrap();
    task.await.unwrap().unwrap();
    assert_eq!(h.analyzer.state(), PipelineState::Idle);
}

#[tokio::test]
async fn dropped_run_does_not_leave_flag_busy() {
    let log = Arc::new(CallLog::default());
    let (extractor, _entered, _release) =
        FakeExtractor::gated(log.clone(), Reply::Text("t".into()));
    let h = harness_with(extractor, Reply::Text("e".into()), log);

    let file = pdf("a.pdf");
    let timed_out =
        tokio::time::timeout(Duration::from_millis(50), h.analyzer.analyze(&file)).await;

    assert!(timed_out.is_err());
    assert_eq!(h.analyzer.state(), PipelineState::Idle);
}

#[tokio::test]
async fn superseded_run_does_not_overwrite_newer_result() {
    let log = Arc::new(CallLog::default());
    let (extractor, entered, release) =
        FakeExtractor::gated(log.clone(), Reply::Text("shared text".into()));
    let h = harness_with(extractor, Reply::Text("explained".into()), log);

    let analyzer = h.analyzer.clone();
    let first = tokio::spawn(async move { analyzer.analyze_record(&pdf("first.pdf")).await });
    entered.await.unwrap();

    let second = h.analyzer.analyze_record(&pdf("second.pdf")).await.unwrap();
    assert_eq!(second.file_name, "second.pdf");
    assert_eq!(h.analyzer.state(), PipelineState::Idle);

    release.send(()).unwrap();
    let first: AnalysisRecord = first.await.unwrap().unwrap();

    // The stale run still answers its own caller...
    assert_eq!(first.file_name, "first.pdf");
    // ...but shared state keeps the newer record and stays idle.
    let latest = h.analyzer.latest_record().unwrap();
    assert_eq!(latest.file_name, "second.pdf");
    assert_eq!(h.analyzer.state(), PipelineState::Idle);
    assert_eq!(h.analyzer.subscribe().borrow().last_started, 2);
}

#[tokio::test]
async fn every_call_reruns_all_steps() {
    let h = harness(Reply::Text("text".into()), Reply::Text("explained".into()));
    let file = pdf("a.pdf");

    h.analyzer.analyze(&file).await.unwrap();
    h.analyzer.analyze(&file).await.unwrap();

    assert_eq!(h.extractor.payloads.lock().unwrap().len(), 2);
    assert_eq!(h.generator.prompts.lock().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Narration
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeSynth {
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
    ) -> docsight_client::Result<SpeechResult> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), language_code.to_string()));
        Ok(SpeechResult {
            audio_url: "data:audio/mpeg;base64,AAAA".into(),
        })
    }
}

#[tokio::test]
async fn narrator_reads_selected_summary() {
    let h = harness(
        Reply::Text("This lease...".into()),
        Reply::Text("In simple terms...".into()),
    );
    let record = h.analyzer.analyze_record(&pdf("lease.pdf")).await.unwrap();

    let synth = Arc::new(FakeSynth::default());
    let narrator = Narrator::new(synth.clone());
    let speech = narrator
        .narrate(&record, SummaryMode::Detailed, "en-US")
        .await
        .unwrap();

    assert_eq!(speech.audio_url, "data:audio/mpeg;base64,AAAA");
    assert_eq!(
        synth.calls.lock().unwrap().clone(),
        vec![("In simple terms...".to_string(), "en-US".to_string())]
    );
}

#[tokio::test]
async fn narrator_refuses_empty_summary() {
    let h = harness(Reply::Text(String::new()), Reply::Text("unused".into()));
    let record = h
        .analyzer
        .analyze_record(&UploadedFile::from_bytes("blank.png", "image/png", vec![1]))
        .await
        .unwrap();

    let synth = Arc::new(FakeSynth::default());
    let err = Narrator::new(synth.clone())
        .narrate(&record, SummaryMode::Simple, "hi-IN")
        .await
        .unwrap_err();

    assert_eq!(err.step(), Some(PipelineStep::Speech));
    assert!(synth.calls.lock().unwrap().is_empty());
}
